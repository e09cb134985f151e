//! Fixed positional schemas for request and response frames
//!
//! Every EBT command frame has the same eight field-groups; only the
//! transaction-type code and the validity rules differ per type.
//!
//! ```text
//! [STX] cmd [FS] version [FS] type [FS] amount [FS] account [FS] trace [FS] cashier [FS] extended [ETX]
//! ```

use std::fmt;

use termwire_types::{CurrencyType, TransactionType};

use crate::constants::{commands, currency_codes, type_codes};

/// Logical meaning of one field-group position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Command,
    Version,
    TransactionCode,
    Amount,
    Account,
    Trace,
    Cashier,
    Extended,
}

impl FieldGroup {
    /// Number of sub-fields the group can carry
    pub fn arity(self) -> usize {
        match self {
            Self::Command | Self::Version | Self::TransactionCode => 1,
            Self::Amount => amount::ARITY,
            Self::Account => account::ARITY,
            Self::Trace => trace::ARITY,
            Self::Cashier | Self::Extended => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Version => "version",
            Self::TransactionCode => "transaction_code",
            Self::Amount => "amount",
            Self::Account => "account",
            Self::Trace => "trace",
            Self::Cashier => "cashier",
            Self::Extended => "extended",
        }
    }
}

/// Sub-field positions in the amount group
pub mod amount {
    pub const AMOUNT: usize = 0;
    pub const TIP: usize = 1;
    pub const CASH_BACK: usize = 2;
    pub const ARITY: usize = 3;
}

/// Sub-field positions in the account group
pub mod account {
    pub const ACCOUNT_NUMBER: usize = 0;
    pub const EXPIRY: usize = 1;
    pub const CVV: usize = 2;
    pub const EBT_TYPE: usize = 3;
    pub const VOUCHER_NUMBER: usize = 4;
    pub const DUPLICATE_OVERRIDE: usize = 5;
    pub const ARITY: usize = 6;
}

/// Sub-field positions in the trace group
pub mod trace {
    pub const REFERENCE_NUMBER: usize = 0;
    pub const ARITY: usize = 1;
}

const EBT_GROUPS: [FieldGroup; 8] = [
    FieldGroup::Command,
    FieldGroup::Version,
    FieldGroup::TransactionCode,
    FieldGroup::Amount,
    FieldGroup::Account,
    FieldGroup::Trace,
    FieldGroup::Cashier,
    FieldGroup::Extended,
];

/// How a transaction type treats the allow-duplicates flag
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Flag is encoded as the duplicate-override sub-field
    Allowed,
    /// Flag must be false
    Rejected,
    /// Flag has no meaning for this type and is never encoded
    Ignored,
}

/// Layout and validity rules for one transaction type
#[derive(Debug)]
pub struct RequestSchema {
    pub transaction_type: TransactionType,
    pub command: &'static str,
    pub type_code: &'static str,
    pub groups: &'static [FieldGroup],
    pub currencies: &'static [CurrencyType],
    /// Currency cashback may be drawn against, if any
    pub cash_back: Option<CurrencyType>,
    pub duplicates: DuplicatePolicy,
    /// Currencies whose frames always carry the duplicate override, whatever the flag says
    pub forced_override: &'static [CurrencyType],
}

impl RequestSchema {
    /// Number of field-groups every frame of this type carries
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Position of a logical group within the frame
    pub fn position(&self, group: FieldGroup) -> Option<usize> {
        self.groups.iter().position(|g| *g == group)
    }

    pub fn allows_currency(&self, currency: CurrencyType) -> bool {
        self.currencies.contains(&currency)
    }

    /// Whether the duplicate-override sub-field is written for this request
    pub fn writes_override(&self, currency: CurrencyType, allow_duplicates: bool) -> bool {
        self.forced_override.contains(&currency)
            || (self.duplicates == DuplicatePolicy::Allowed && allow_duplicates)
    }
}

static PURCHASE: RequestSchema = RequestSchema {
    transaction_type: TransactionType::Purchase,
    command: commands::DO_EBT,
    type_code: type_codes::PURCHASE,
    groups: &EBT_GROUPS,
    currencies: &[CurrencyType::FoodStamps, CurrencyType::CashBenefits, CurrencyType::Voucher],
    cash_back: Some(CurrencyType::CashBenefits),
    duplicates: DuplicatePolicy::Allowed,
    forced_override: &[],
};

static REFUND: RequestSchema = RequestSchema {
    transaction_type: TransactionType::Refund,
    command: commands::DO_EBT,
    type_code: type_codes::REFUND,
    groups: &EBT_GROUPS,
    currencies: &[CurrencyType::FoodStamps, CurrencyType::CashBenefits],
    cash_back: None,
    duplicates: DuplicatePolicy::Rejected,
    forced_override: &[],
};

static WITHDRAWAL: RequestSchema = RequestSchema {
    transaction_type: TransactionType::Withdrawal,
    command: commands::DO_EBT,
    type_code: type_codes::WITHDRAWAL,
    groups: &EBT_GROUPS,
    currencies: &[CurrencyType::CashBenefits],
    cash_back: None,
    duplicates: DuplicatePolicy::Rejected,
    forced_override: &[],
};

static BALANCE_INQUIRY: RequestSchema = RequestSchema {
    transaction_type: TransactionType::BalanceInquiry,
    command: commands::DO_EBT,
    type_code: type_codes::BALANCE_INQUIRY,
    groups: &EBT_GROUPS,
    currencies: &[CurrencyType::FoodStamps, CurrencyType::CashBenefits],
    cash_back: None,
    duplicates: DuplicatePolicy::Ignored,
    forced_override: &[CurrencyType::CashBenefits],
};

/// Schema for a transaction type
pub fn request_schema(transaction_type: TransactionType) -> &'static RequestSchema {
    match transaction_type {
        TransactionType::Purchase => &PURCHASE,
        TransactionType::Refund => &REFUND,
        TransactionType::Withdrawal => &WITHDRAWAL,
        TransactionType::BalanceInquiry => &BALANCE_INQUIRY,
    }
}

/// Single-character currency discriminator
pub fn currency_code(currency: CurrencyType) -> &'static str {
    match currency {
        CurrencyType::FoodStamps => currency_codes::FOODSTAMPS,
        CurrencyType::CashBenefits => currency_codes::CASH_BENEFITS,
        CurrencyType::Voucher => currency_codes::VOUCHER,
    }
}

/// Address of a sub-field inside a decoded frame
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldPos {
    pub group: usize,
    pub sub: usize,
}

impl FieldPos {
    pub const fn new(group: usize, sub: usize) -> Self {
        Self { group, sub }
    }
}

/// Response family, selecting the fixed schema and status table to decode with
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// EBT transaction reply, coded by the host response
    Transaction,
    /// Administrative reply (initialize, reset), coded by the device result
    Admin,
    /// Cancel acknowledgement, single-digit status
    Cancel,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 3] = [Self::Transaction, Self::Admin, Self::Cancel];

    pub fn schema(self) -> &'static ResponseSchema {
        match self {
            Self::Transaction => &TRANSACTION_RESPONSE,
            Self::Admin => &ADMIN_RESPONSE,
            Self::Cancel => &CANCEL_RESPONSE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Admin => "admin",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed offsets used to decode a response kind
#[derive(Debug)]
pub struct ResponseSchema {
    pub kind: ResponseKind,
    /// Fewer groups than this means the frame is truncated or from another vendor
    pub min_groups: usize,
    pub code_at: FieldPos,
    pub text_at: Option<FieldPos>,
}

// [T05, version, device code, device message, host group, ...]
static TRANSACTION_RESPONSE: ResponseSchema = ResponseSchema {
    kind: ResponseKind::Transaction,
    min_groups: 5,
    code_at: FieldPos::new(4, 0),
    text_at: Some(FieldPos::new(4, 1)),
};

static ADMIN_RESPONSE: ResponseSchema = ResponseSchema {
    kind: ResponseKind::Admin,
    min_groups: 3,
    code_at: FieldPos::new(2, 0),
    text_at: Some(FieldPos::new(3, 0)),
};

static CANCEL_RESPONSE: ResponseSchema = ResponseSchema {
    kind: ResponseKind::Cancel,
    min_groups: 3,
    code_at: FieldPos::new(2, 0),
    text_at: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_type_has_fixed_arity() {
        for transaction_type in TransactionType::ALL {
            let schema = request_schema(transaction_type);
            assert_eq!(schema.transaction_type, transaction_type);
            assert_eq!(schema.group_count(), 8);
            assert_eq!(schema.position(FieldGroup::Command), Some(0));
            assert_eq!(schema.position(FieldGroup::Trace), Some(5));
        }
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(request_schema(TransactionType::Purchase).type_code, "01");
        assert_eq!(request_schema(TransactionType::Refund).type_code, "02");
        assert_eq!(request_schema(TransactionType::Withdrawal).type_code, "07");
        assert_eq!(request_schema(TransactionType::BalanceInquiry).type_code, "23");
    }

    #[test]
    fn test_validity_matrix() {
        let purchase = request_schema(TransactionType::Purchase);
        assert!(CurrencyType::ALL.iter().all(|c| purchase.allows_currency(*c)));

        let balance = request_schema(TransactionType::BalanceInquiry);
        assert!(!balance.allows_currency(CurrencyType::Voucher));

        let withdrawal = request_schema(TransactionType::Withdrawal);
        assert!(withdrawal.allows_currency(CurrencyType::CashBenefits));
        assert!(!withdrawal.allows_currency(CurrencyType::FoodStamps));
        assert_eq!(withdrawal.duplicates, DuplicatePolicy::Rejected);
    }

    #[test]
    fn test_override_rules() {
        let purchase = request_schema(TransactionType::Purchase);
        assert!(purchase.writes_override(CurrencyType::FoodStamps, true));
        assert!(!purchase.writes_override(CurrencyType::CashBenefits, false));

        let refund = request_schema(TransactionType::Refund);
        assert!(!refund.writes_override(CurrencyType::FoodStamps, true));

        let balance = request_schema(TransactionType::BalanceInquiry);
        assert!(balance.writes_override(CurrencyType::CashBenefits, false));
        assert!(!balance.writes_override(CurrencyType::FoodStamps, true));
    }

    #[test]
    fn test_response_code_positions_inside_min_groups() {
        for kind in ResponseKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.kind, kind);
            assert!(schema.code_at.group < schema.min_groups);
        }
    }
}
