//! High-level error types

use termwire_core::{FrameError, ValidationError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] termwire_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] termwire_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] termwire_types::Error),

    #[error("Terminal not connected")]
    NotConnected,

    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },
}

impl Error {
    /// Validation failure, if that is what this is
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Core(termwire_core::Error::Validation(err)) => Some(err),
            _ => None,
        }
    }

    /// Frame failure, if that is what this is
    pub fn as_frame(&self) -> Option<&FrameError> {
        match self {
            Self::Core(termwire_core::Error::Frame(err)) => Some(err),
            _ => None,
        }
    }

    /// Check if the request could succeed on a later attempt without changes.
    /// Nothing here retries; the decision is the caller's.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport(
                termwire_transport::Error::ReadTimeout
                    | termwire_transport::Error::ConnectionTimeout
                    | termwire_transport::Error::ConnectionClosed
                    | termwire_transport::Error::Io(_)
            )
        )
    }
}

impl Error {
    /// Check if the terminal must be reconnected before it can be used again
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::NotConnected => true,
            Self::Transport(err) => err.requires_reconnect(),
            _ => false,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Core(err.into())
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Self::Core(err.into())
    }
}
