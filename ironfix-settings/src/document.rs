/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session settings document.
//!
//! The settings format is the line-oriented QuickFIX format:
//!
//! ```text
//! # comment
//! [DEFAULT]
//! ConnectionType=acceptor
//! HeartBtInt=30
//!
//! [SESSION]
//! BeginString=FIX.4.4
//! SenderCompID=EXEC
//! TargetCompID=BANZAI
//! ```
//!
//! Every `[SESSION]` section inherits the `[DEFAULT]` values and must end up
//! with `BeginString`, `SenderCompID` and `TargetCompID` after merging.
//! Values may reference properties as `${name}`.

use crate::properties::{MapProperties, PropertySource};
use ironfix_core::error::SettingsError;
use ironfix_core::{CompId, SessionId, is_key_safe};
use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

/// Key/value pairs of one settings section.
pub type Properties = BTreeMap<String, String>;

/// `BeginString` key.
pub const BEGIN_STRING: &str = "BeginString";
/// `SenderCompID` key.
pub const SENDER_COMP_ID: &str = "SenderCompID";
/// `SenderSubID` key.
pub const SENDER_SUB_ID: &str = "SenderSubID";
/// `SenderLocationID` key.
pub const SENDER_LOCATION_ID: &str = "SenderLocationID";
/// `TargetCompID` key.
pub const TARGET_COMP_ID: &str = "TargetCompID";
/// `TargetSubID` key.
pub const TARGET_SUB_ID: &str = "TargetSubID";
/// `TargetLocationID` key.
pub const TARGET_LOCATION_ID: &str = "TargetLocationID";
/// `SessionQualifier` key.
pub const SESSION_QUALIFIER: &str = "SessionQualifier";

/// Parsed settings document.
///
/// Session entries keep only the keys declared in their own section;
/// lookups fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    defaults: Properties,
    sessions: Vec<(SessionId, Properties)>,
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Default,
    Session(usize),
}

impl SessionSettings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a settings document, interpolating `${name}` references with
    /// the given property source.
    ///
    /// # Errors
    /// Returns `SettingsError::Parse` for malformed lines,
    /// `SettingsError::MissingKey`/`InvalidValue` for incomplete session
    /// identities, `SettingsError::DuplicateSession` for repeated sessions and
    /// `SettingsError::Io` when the reader fails.
    pub fn parse<R: Read>(reader: R, properties: &dyn PropertySource) -> Result<Self, SettingsError> {
        let mut defaults = Properties::new();
        let mut raw_sessions: Vec<Properties> = Vec::new();
        let mut current: Option<Section> = None;

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                current = Some(match name.trim().to_ascii_uppercase().as_str() {
                    "DEFAULT" => Section::Default,
                    "SESSION" => {
                        raw_sessions.push(Properties::new());
                        Section::Session(raw_sessions.len() - 1)
                    }
                    other => {
                        return Err(SettingsError::Parse {
                            line: line_no,
                            reason: format!("unknown section [{other}]"),
                        });
                    }
                });
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(SettingsError::Parse {
                    line: line_no,
                    reason: "expected key=value".to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::Parse {
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }
            let value = interpolate(value.trim(), properties);

            let target = match current {
                Some(Section::Default) => &mut defaults,
                Some(Section::Session(idx)) => &mut raw_sessions[idx],
                None => {
                    return Err(SettingsError::Parse {
                        line: line_no,
                        reason: format!("'{key}' appears before any section header"),
                    });
                }
            };
            target.insert(key.to_string(), value);
        }

        let mut seen = HashSet::with_capacity(raw_sessions.len());
        let mut sessions = Vec::with_capacity(raw_sessions.len());
        for (index, own) in raw_sessions.into_iter().enumerate() {
            let id = session_id_from(index + 1, &own, &defaults)?;
            if !seen.insert(id.clone()) {
                return Err(SettingsError::DuplicateSession(id.to_string()));
            }
            sessions.push((id, own));
        }

        Ok(Self { defaults, sessions })
    }

    /// Returns the `[DEFAULT]` section.
    #[must_use]
    pub fn defaults(&self) -> &Properties {
        &self.defaults
    }

    /// Returns a default value.
    #[must_use]
    pub fn get_default(&self, key: &str) -> Option<&str> {
        self.defaults.get(key).map(String::as_str)
    }

    /// Sets a default value.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.defaults.insert(key.into(), value.into());
    }

    /// Adds a session with its own section values.
    ///
    /// # Errors
    /// Returns `SettingsError::DuplicateSession` if the session already exists.
    pub fn add_session(&mut self, id: SessionId, own: Properties) -> Result<(), SettingsError> {
        if self.contains(&id) {
            return Err(SettingsError::DuplicateSession(id.to_string()));
        }
        self.sessions.push((id, own));
        Ok(())
    }

    /// Returns session identities in document order.
    pub fn session_ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.iter().map(|(id, _)| id)
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if there are neither defaults nor sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.sessions.is_empty()
    }

    /// Returns true if the session is declared.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.iter().any(|(sid, _)| sid == id)
    }

    /// Returns the merged view (defaults overlaid with session values).
    #[must_use]
    pub fn session_properties(&self, id: &SessionId) -> Option<Properties> {
        let own = self.own(id)?;
        let mut merged = self.defaults.clone();
        merged.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(merged)
    }

    /// Looks up a session value, falling back to the defaults.
    #[must_use]
    pub fn get(&self, id: &SessionId, key: &str) -> Option<&str> {
        self.own(id)
            .and_then(|own| own.get(key))
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    /// Looks up a boolean session value (`Y`/`N`, `true`/`false`).
    ///
    /// # Errors
    /// Returns `SettingsError::InvalidValue` for anything else.
    pub fn get_bool(&self, id: &SessionId, key: &'static str) -> Result<Option<bool>, SettingsError> {
        self.get(id, key)
            .map(|value| match value.to_ascii_uppercase().as_str() {
                "Y" | "YES" | "TRUE" => Ok(true),
                "N" | "NO" | "FALSE" => Ok(false),
                _ => Err(SettingsError::InvalidValue {
                    key,
                    value: value.to_string(),
                }),
            })
            .transpose()
    }

    /// Looks up an unsigned integer session value.
    ///
    /// # Errors
    /// Returns `SettingsError::InvalidValue` if the value is not a number.
    pub fn get_u64(&self, id: &SessionId, key: &'static str) -> Result<Option<u64>, SettingsError> {
        self.get(id, key)
            .map(|value| {
                value.parse::<u64>().map_err(|_| SettingsError::InvalidValue {
                    key,
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    fn own(&self, id: &SessionId) -> Option<&Properties> {
        self.sessions
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, own)| own)
    }
}

impl FromStr for SessionSettings {
    type Err = SettingsError;

    /// Parses without property interpolation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes(), &MapProperties::new())
    }
}

fn session_id_from(
    section: usize,
    own: &Properties,
    defaults: &Properties,
) -> Result<SessionId, SettingsError> {
    let lookup = |key: &str| {
        own.get(key)
            .or_else(|| defaults.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    };
    let invalid = |key: &'static str, value: &str| SettingsError::InvalidValue {
        key,
        value: value.to_string(),
    };
    // Identity values end up in the session key and may not contain its separators.
    let optional = |key: &'static str| -> Result<Option<String>, SettingsError> {
        match lookup(key) {
            Some(value) if !is_key_safe(value) => Err(invalid(key, value)),
            value => Ok(value.map(str::to_string)),
        }
    };
    let required = |key: &'static str| -> Result<String, SettingsError> {
        optional(key)?.ok_or(SettingsError::MissingKey { section, key })
    };
    let comp_id = |key: &'static str| -> Result<CompId, SettingsError> {
        let value = required(key)?;
        CompId::new(&value).ok_or_else(|| invalid(key, &value))
    };

    let mut id = SessionId::new(
        required(BEGIN_STRING)?,
        comp_id(SENDER_COMP_ID)?,
        comp_id(TARGET_COMP_ID)?,
    );
    id.sender_sub_id = optional(SENDER_SUB_ID)?;
    id.sender_location_id = optional(SENDER_LOCATION_ID)?;
    id.target_sub_id = optional(TARGET_SUB_ID)?;
    id.target_location_id = optional(TARGET_LOCATION_ID)?;
    id.session_qualifier = lookup(SESSION_QUALIFIER).map(str::to_string);
    Ok(id)
}

/// Replaces `${name}` references; unknown names are kept verbatim.
fn interpolate(value: &str, properties: &dyn PropertySource) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match properties.property(name) {
                    Some(resolved) => out.push_str(&resolved),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
