/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session identity.
//!
//! A [`SessionId`] names one logical FIX session independently of the state of
//! any network connection. Its canonical string form is used as the session
//! key by the management endpoints:
//!
//! ```text
//! BEGIN:SENDER[/SUB[/LOC]]->TARGET[/SUB[/LOC]][:QUALIFIER]
//! ```

use crate::error::SessionError;
use crate::types::CompId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one FIX session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: CompId,
    /// Optional sender sub ID.
    pub sender_sub_id: Option<String>,
    /// Optional sender location ID.
    pub sender_location_id: Option<String>,
    /// Target CompID.
    pub target_comp_id: CompId,
    /// Optional target sub ID.
    pub target_sub_id: Option<String>,
    /// Optional target location ID.
    pub target_location_id: Option<String>,
    /// Optional qualifier distinguishing otherwise identical sessions.
    pub session_qualifier: Option<String>,
}

impl SessionId {
    /// Creates a new session ID.
    ///
    /// # Arguments
    /// * `begin_string` - FIX version, e.g. `FIX.4.4`
    /// * `sender` - Sender CompID
    /// * `target` - Target CompID
    #[must_use]
    pub fn new(begin_string: impl Into<String>, sender: CompId, target: CompId) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender,
            sender_sub_id: None,
            sender_location_id: None,
            target_comp_id: target,
            target_sub_id: None,
            target_location_id: None,
            session_qualifier: None,
        }
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the sender location ID.
    #[must_use]
    pub fn with_sender_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.sender_location_id = Some(location_id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target location ID.
    #[must_use]
    pub fn with_target_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.target_location_id = Some(location_id.into());
        self
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.session_qualifier = Some(qualifier.into());
        self
    }

    /// Returns the canonical key string for this session.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

/// Returns `true` if `value` can be used as a BeginString, CompID, sub ID or
/// location ID without breaking the canonical key.
///
/// The key separators `:`, `/` and `->` are not allowed.
///
/// # Arguments
/// * `value` - The identity value to check
#[must_use]
pub fn is_key_safe(value: &str) -> bool {
    !value.contains([':', '/']) && !value.contains("->")
}

fn write_party(
    f: &mut fmt::Formatter<'_>,
    comp_id: &CompId,
    sub_id: Option<&str>,
    location_id: Option<&str>,
) -> fmt::Result {
    write!(f, "{comp_id}")?;
    match (sub_id, location_id) {
        (None, None) => Ok(()),
        (Some(sub), None) => write!(f, "/{sub}"),
        (sub, Some(loc)) => write!(f, "/{}/{loc}", sub.unwrap_or_default()),
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.begin_string)?;
        write_party(
            f,
            &self.sender_comp_id,
            self.sender_sub_id.as_deref(),
            self.sender_location_id.as_deref(),
        )?;
        write!(f, "->")?;
        write_party(
            f,
            &self.target_comp_id,
            self.target_sub_id.as_deref(),
            self.target_location_id.as_deref(),
        )?;
        if let Some(qualifier) = &self.session_qualifier {
            write!(f, ":{qualifier}")?;
        }
        Ok(())
    }
}

type Party = (CompId, Option<String>, Option<String>);

fn parse_party(key: &str, part: &str) -> Result<Party, SessionError> {
    let invalid = |reason: &str| SessionError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let mut pieces = part.split('/');
    let comp_id = pieces
        .next()
        .and_then(CompId::new)
        .ok_or_else(|| invalid("missing or oversized CompID"))?;
    let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);
    let sub_id = non_empty(pieces.next());
    let location_id = non_empty(pieces.next());
    if pieces.next().is_some() {
        return Err(invalid("too many '/' separated parts"));
    }
    Ok((comp_id, sub_id, location_id))
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SessionError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        let (begin_string, rest) = key
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' after BeginString"))?;
        if begin_string.is_empty() {
            return Err(invalid("empty BeginString"));
        }
        let (sender, target) = rest
            .split_once("->")
            .ok_or_else(|| invalid("missing '->'"))?;
        let (target, qualifier) = match target.split_once(':') {
            Some((target, qualifier)) if !qualifier.is_empty() => {
                (target, Some(qualifier.to_string()))
            }
            Some(_) => return Err(invalid("empty qualifier")),
            None => (target, None),
        };

        let (sender_comp_id, sender_sub_id, sender_location_id) = parse_party(key, sender)?;
        let (target_comp_id, target_sub_id, target_location_id) = parse_party(key, target)?;

        Ok(Self {
            begin_string: begin_string.to_string(),
            sender_comp_id,
            sender_sub_id,
            sender_location_id,
            target_comp_id,
            target_sub_id,
            target_location_id,
            session_qualifier: qualifier,
        })
    }
}
