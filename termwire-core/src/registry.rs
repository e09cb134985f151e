//! Status code tables
//!
//! Maps the coded value found in a response to a semantic [`Status`], keyed by
//! [`ResponseKind`]. Tables are static data; lookup never fails and resolves
//! codes it does not know to [`Status::Unknown`].

use std::fmt;

use tracing::warn;

use crate::schema::ResponseKind;

/// Semantic outcome of a response
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Approved,
    PartiallyApproved,
    Declined,
    Success,
    Failed,
    Timeout,
    Aborted,
    ParameterError,
    UnsupportedTransaction,
    DuplicateTransaction,
    CommunicationError,
    /// Code not present in the table for its response kind
    Unknown,
}

impl Status {
    /// Check if the terminal completed the request
    pub fn is_success(self) -> bool {
        matches!(self, Self::Approved | Self::PartiallyApproved | Self::Success)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::PartiallyApproved => "PARTIALLY_APPROVED",
            Self::Declined => "DECLINED",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
            Self::Aborted => "ABORTED",
            Self::ParameterError => "PARAMETER_ERROR",
            Self::UnsupportedTransaction => "UNSUPPORTED_TRANSACTION",
            Self::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            Self::CommunicationError => "COMMUNICATION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Host response codes
static TRANSACTION_CODES: &[(&str, Status)] = &[
    ("00", Status::Approved),
    ("10", Status::PartiallyApproved),
    ("05", Status::Declined),
    ("51", Status::Declined), // insufficient funds
    ("55", Status::Declined), // incorrect PIN
    ("94", Status::DuplicateTransaction),
];

// Device result codes
static ADMIN_CODES: &[(&str, Status)] = &[
    ("000000", Status::Success),
    ("000100", Status::Declined),
    ("100001", Status::Timeout),
    ("100002", Status::Aborted),
    ("100003", Status::ParameterError),
    ("100004", Status::UnsupportedTransaction),
    ("100005", Status::UnsupportedTransaction),
    ("100007", Status::CommunicationError),
    ("100008", Status::CommunicationError),
    ("100009", Status::CommunicationError),
    ("100010", Status::CommunicationError),
    ("100011", Status::DuplicateTransaction),
];

static CANCEL_CODES: &[(&str, Status)] = &[
    ("0", Status::Success),
    ("1", Status::Failed),
];

/// Table of known codes for a response kind
pub fn table(kind: ResponseKind) -> &'static [(&'static str, Status)] {
    match kind {
        ResponseKind::Transaction => TRANSACTION_CODES,
        ResponseKind::Admin => ADMIN_CODES,
        ResponseKind::Cancel => CANCEL_CODES,
    }
}

/// Resolve a response code to its status
///
/// # Examples
///
/// ```
/// use termwire_core::{registry, ResponseKind, Status};
///
/// assert_eq!(registry::lookup(ResponseKind::Transaction, "00"), Status::Approved);
/// assert_eq!(registry::lookup(ResponseKind::Transaction, "Z9"), Status::Unknown);
/// ```
pub fn lookup(kind: ResponseKind, code: &str) -> Status {
    let code = code.trim();

    match table(kind).iter().find(|(known, _)| *known == code) {
        Some((_, status)) => *status,
        None => {
            warn!(kind = %kind, code = code, "Unmapped status code");
            Status::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_known_codes() {
        assert_eq!(lookup(ResponseKind::Transaction, "00"), Status::Approved);
        assert_eq!(lookup(ResponseKind::Admin, "000000"), Status::Success);
        assert_eq!(lookup(ResponseKind::Admin, "100002"), Status::Aborted);
        assert_eq!(lookup(ResponseKind::Cancel, "1"), Status::Failed);
    }

    #[test]
    fn test_lookup_is_keyed_by_kind() {
        // Same code, different tables
        assert_eq!(lookup(ResponseKind::Transaction, "000000"), Status::Unknown);
        assert_eq!(lookup(ResponseKind::Admin, "00"), Status::Unknown);
        assert_eq!(lookup(ResponseKind::Cancel, "00"), Status::Unknown);
    }

    #[test]
    fn test_lookup_empty_code() {
        for kind in ResponseKind::ALL {
            assert_eq!(lookup(kind, ""), Status::Unknown);
        }
    }

    #[test]
    fn test_status_success() {
        assert!(Status::Approved.is_success());
        assert!(Status::Success.is_success());
        assert!(!Status::Declined.is_success());
        assert!(!Status::Unknown.is_success());
    }

    #[test]
    fn test_tables_have_no_duplicate_codes() {
        for kind in ResponseKind::ALL {
            let codes = table(kind);
            for (i, (code, _)) in codes.iter().enumerate() {
                assert!(
                    codes[i + 1..].iter().all(|(other, _)| other != code),
                    "duplicate code {} in {} table",
                    code,
                    kind
                );
            }
        }
    }

    proptest! {
        #[test]
        fn prop_lookup_is_total(code in ".{0,8}") {
            for kind in ResponseKind::ALL {
                let status = lookup(kind, &code);
                let known = table(kind).iter().any(|(c, _)| *c == code.trim());
                prop_assert_eq!(status == Status::Unknown, !known);
            }
        }
    }
}
