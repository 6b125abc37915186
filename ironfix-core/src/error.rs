/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Error types for IronFix settings resolution and session introspection.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all IronFix operations.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Boxed error used to carry the underlying cause of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all IronFix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error while locating or parsing session settings.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Error in session registry operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in the management endpoint layer.
    #[error("actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// Invalid service configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O error from the underlying platform.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while locating and parsing a settings document.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No settings source yielded a usable configuration.
    ///
    /// Also raised when the selected source could not be read or parsed; the
    /// original failure is kept as the error source.
    #[error("settings not found: {message}")]
    NotFound {
        /// Human-readable description of what failed.
        message: String,
        /// The underlying I/O or parse failure, if any.
        #[source]
        cause: Option<BoxError>,
    },

    /// Malformed line in a settings document.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A session section lacks one of the identity keys.
    #[error("session section #{section} is missing required key {key}")]
    MissingKey {
        /// 1-based index of the session section.
        section: usize,
        /// Name of the missing key.
        key: &'static str,
    },

    /// A session identity value is not a valid identifier.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Name of the key.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// Two session sections resolve to the same session identity.
    #[error("duplicate session: {0}")]
    DuplicateSession(String),

    /// I/O failure while reading a settings document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    /// Creates a `NotFound` error without an underlying cause.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps an I/O or parse failure into a `NotFound` error.
    #[must_use]
    pub fn not_found_caused_by(
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::NotFound {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Returns true if this is a `NotFound` error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors in session registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session is not part of the registry.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The session is already registered.
    #[error("session already registered: {0}")]
    DuplicateSession(String),

    /// The registry has not been initialized by the engine yet.
    #[error("session registry not initialized")]
    NotInitialized,

    /// A session key string could not be parsed.
    #[error("invalid session key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },
}

/// Errors raised by management endpoints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The queried session does not exist in the live session table.
    #[error("session not found: {0}")]
    NotFound(String),

    /// No endpoint is registered under the given id.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// An endpoint with the same id is already registered.
    #[error("endpoint already registered: {0}")]
    DuplicateEndpoint(String),

    /// The selector passed to an endpoint is malformed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}
