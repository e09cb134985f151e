//! # termwire
//!
//! Command builder and response decoder for point-of-sale payment terminals,
//! with EBT (food stamps, cash benefits, vouchers) transaction support.
//!
//! ## Features
//!
//! - Validating request builder: invalid requests never reach the wire
//! - Fixed positional schemas per transaction type
//! - Total status code lookup (unknown codes never fail)
//! - Async/await API using Tokio, one in-flight request per terminal
//!
//! ## Quick Start
//!
//! ```no_run
//! use termwire::{CurrencyType, Decimal, TcpChannel, Terminal, TransactionRequest, DEFAULT_PORT};
//!
//! #[tokio::main]
//! async fn main() -> termwire::Result<()> {
//!     let terminal = Terminal::new(TcpChannel::new("192.168.1.50", DEFAULT_PORT));
//!     terminal.connect().await?;
//!
//!     let request = TransactionRequest::purchase(1, Decimal::new(1000, 2), CurrencyType::FoodStamps);
//!     let response = terminal.execute(&request).await?;
//!     println!("{}", response);
//!
//!     terminal.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod terminal;

// Re-exports
pub use error::{Error, Result};
pub use terminal::Terminal;

pub use termwire_core::{
    AdminCommand, Frame, RequestBuilder, ResponseKind, ResponseMessage, Status, ValidationError,
    DEFAULT_PORT,
};
pub use termwire_transport::{DeviceChannel, TcpChannel};
pub use termwire_types::{CurrencyType, Decimal, TransactionRequest, TransactionType};
