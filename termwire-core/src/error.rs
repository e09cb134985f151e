//! Error types for termwire-core

use bytes::Bytes;
use rust_decimal::Decimal;

use termwire_types::{CurrencyType, TransactionType};

/// Result type alias for termwire-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request rejected before any bytes were produced
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Response buffer is not a well-formed frame
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Admin command code not recognized
    #[error("Unknown admin command: {0}")]
    UnknownCommand(String),
}

impl Error {
    /// Check if the caller can fix the request and try again
    pub fn is_caller_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownCommand(_))
    }

    /// Check if the error points at a corrupted or foreign frame
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}

/// Request violates the validity matrix or a required field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Field values are individually fine but not allowed together
    #[error("Invalid combination for {transaction_type} ({currency}): {reason}")]
    InvalidCombination {
        transaction_type: TransactionType,
        currency: CurrencyType,
        field: &'static str,
        reason: &'static str,
    },

    /// Required field absent
    #[error("Missing required field: {field}")]
    MissingField {
        field: &'static str,
    },

    /// Amount is negative, zero where not allowed, or finer than one cent
    #[error("Invalid {field}: {amount}")]
    InvalidAmount {
        field: &'static str,
        amount: Decimal,
    },
}

impl ValidationError {
    /// Name of the offending field, for diagnostics
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidCombination { field, .. }
            | Self::MissingField { field }
            | Self::InvalidAmount { field, .. } => *field,
        }
    }
}

/// Response buffer lacks proper markers or has too few field-groups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Frame is empty")]
    Empty,

    #[error("Frame does not begin with STX: {}", hex::encode(.raw))]
    MissingStartMarker {
        raw: Bytes,
    },

    #[error("Frame has no ETX terminator: {}", hex::encode(.raw))]
    MissingEndMarker {
        raw: Bytes,
    },

    #[error("Frame has {actual} field-groups, {kind} response needs at least {expected}: {}", hex::encode(.raw))]
    TooFewGroups {
        kind: crate::schema::ResponseKind,
        expected: usize,
        actual: usize,
        raw: Bytes,
    },
}

impl FrameError {
    /// Raw bytes that failed to decode
    pub fn raw(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::MissingStartMarker { raw }
            | Self::MissingEndMarker { raw }
            | Self::TooFewGroups { raw, .. } => raw,
        }
    }
}
