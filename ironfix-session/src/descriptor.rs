/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session descriptors.

use ironfix_core::{SessionId, Timestamp};
use std::fmt;
use std::str::FromStr;

/// Which side of the connection the engine plays for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    /// Accepts connections from initiators (server).
    Acceptor,
    /// Connects to acceptors (client).
    Initiator,
}

impl SessionRole {
    /// Returns the `ConnectionType` value used in settings documents.
    #[must_use]
    pub const fn connection_type(self) -> &'static str {
        match self {
            Self::Acceptor => "acceptor",
            Self::Initiator => "initiator",
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.connection_type())
    }
}

impl FromStr for SessionRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acceptor" => Ok(Self::Acceptor),
            "initiator" => Ok(Self::Initiator),
            other => Err(format!("unknown connection type: {other}")),
        }
    }
}

/// Point-in-time view of one session.
///
/// Produced by the session table; holders never observe later changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// Session identity.
    pub id: SessionId,
    /// Engine role for this session.
    pub role: SessionRole,
    /// Whether a counterparty is currently connected.
    pub connected: bool,
    /// Time of the last observed activity, if any.
    pub last_activity: Option<Timestamp>,
}

impl SessionDescriptor {
    /// Returns the canonical session key.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("Acceptor".parse::<SessionRole>(), Ok(SessionRole::Acceptor));
        assert_eq!(" initiator ".parse::<SessionRole>(), Ok(SessionRole::Initiator));
        assert!("both".parse::<SessionRole>().is_err());
        assert_eq!(SessionRole::Acceptor.to_string(), "acceptor");
    }
}
