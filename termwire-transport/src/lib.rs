//! Transport layer for terminal protocol
//!
//! Moves encoded frames to and from a terminal. Framing, validation and
//! decoding live in `termwire-core`; this crate only carries bytes.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpChannel;

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte channel to a single terminal
///
/// A terminal processes one command at a time. Callers must hold exclusive
/// access across a whole send/receive cycle.
#[async_trait]
pub trait DeviceChannel: Send + Sync {
    /// Open the channel
    async fn connect(&mut self) -> Result<()>;

    /// Close the channel
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send one encoded frame
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one complete response frame (with its trailer, if any)
    async fn receive(&mut self) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
