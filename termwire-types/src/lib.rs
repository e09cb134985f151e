//! Type definitions for termwire

pub mod error;
pub mod transaction;

pub use error::{Error, Result};
pub use transaction::{CurrencyType, TransactionRequest, TransactionType};

pub use rust_decimal::Decimal;
