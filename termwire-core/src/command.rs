//! Administrative command definitions

use std::fmt;
use std::str::FromStr;

use crate::{
    constants::commands,
    error::{Error, Result},
    schema::ResponseKind,
};

/// Administrative commands (no transaction data, `[command, version]` only)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AdminCommand {
    Initialize,
    Cancel,
    Reset,
}

impl AdminCommand {
    pub const ALL: [AdminCommand; 3] = [Self::Initialize, Self::Cancel, Self::Reset];

    /// Wire code sent in the command group
    pub fn code(self) -> &'static str {
        match self {
            Self::Initialize => commands::INITIALIZE,
            Self::Cancel => commands::CANCEL,
            Self::Reset => commands::RESET,
        }
    }

    /// Code the terminal answers with
    pub fn response_code(self) -> &'static str {
        match self {
            Self::Initialize => commands::INITIALIZE_RESPONSE,
            Self::Cancel => commands::CANCEL_RESPONSE,
            Self::Reset => commands::RESET_RESPONSE,
        }
    }

    /// Schema used to decode the reply
    pub fn response_kind(self) -> ResponseKind {
        match self {
            Self::Initialize | Self::Reset => ResponseKind::Admin,
            Self::Cancel => ResponseKind::Cancel,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Initialize => "INITIALIZE",
            Self::Cancel => "CANCEL",
            Self::Reset => "RESET",
        }
    }
}

impl TryFrom<&str> for AdminCommand {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            commands::INITIALIZE => Ok(Self::Initialize),
            commands::CANCEL => Ok(Self::Cancel),
            commands::RESET => Ok(Self::Reset),
            _ => Err(Error::UnknownCommand(value.to_string())),
        }
    }
}

impl FromStr for AdminCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}
