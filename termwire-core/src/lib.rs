//! # termwire-core
//!
//! Protocol core for point-of-sale payment terminals.
//!
//! This crate provides the protocol primitives, with no I/O:
//! - Wire constants and per-transaction-type schemas
//! - Frame encoding/decoding (STX / FS / US / ETX)
//! - LRC checksum
//! - Validating command builder
//! - Response decoding and status code tables

pub mod builder;
pub mod checksum;
pub mod command;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod framer;
pub mod registry;
pub mod schema;

pub use builder::RequestBuilder;
pub use command::AdminCommand;
pub use decoder::ResponseMessage;
pub use error::{Error, FrameError, Result, ValidationError};
pub use framer::Frame;
pub use registry::Status;
pub use schema::{FieldPos, ResponseKind};

pub use constants::{DEFAULT_PORT, PROTOCOL_VERSION};
