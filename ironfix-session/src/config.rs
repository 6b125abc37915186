/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session configuration.
//!
//! This module derives the runtime options of one session from a parsed
//! settings document, applying the usual QuickFIX keys and defaults.

use crate::descriptor::SessionRole;
use ironfix_core::SessionId;
use ironfix_core::error::SettingsError;
use ironfix_settings::SessionSettings;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Default heartbeat interval in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;
/// Default logon/logout timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default acceptor bind address.
pub const DEFAULT_ACCEPT_ADDRESS: &str = "0.0.0.0";

/// Network endpoint of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEndpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Configuration for a FIX session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Session identity.
    pub session_id: SessionId,
    /// Engine role.
    pub role: SessionRole,
    /// Heartbeat interval (`HeartBtInt`).
    pub heartbeat_interval: Duration,
    /// Whether to reset sequence numbers on logon (`ResetOnLogon`).
    pub reset_on_logon: bool,
    /// Whether to reset sequence numbers on logout (`ResetOnLogout`).
    pub reset_on_logout: bool,
    /// Whether to reset sequence numbers on disconnect (`ResetOnDisconnect`).
    pub reset_on_disconnect: bool,
    /// Logon timeout (`LogonTimeout`).
    pub logon_timeout: Duration,
    /// Logout timeout (`LogoutTimeout`).
    pub logout_timeout: Duration,
    /// Accept or connect endpoint, when configured.
    pub endpoint: Option<SocketEndpoint>,
}

impl SessionConfig {
    /// Creates a configuration with default options.
    ///
    /// # Arguments
    /// * `session_id` - The session this configuration applies to
    /// * `role` - Whether the engine accepts or initiates the session
    #[must_use]
    pub fn new(session_id: SessionId, role: SessionRole) -> Self {
        Self {
            session_id,
            role,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            reset_on_logon: false,
            reset_on_logout: false,
            reset_on_disconnect: false,
            logon_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            logout_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoint: None,
        }
    }

    /// Derives the configuration of one session from the settings.
    ///
    /// # Errors
    /// Returns `SettingsError::InvalidValue` for values of the wrong type or
    /// out of range (including an unknown `ConnectionType`), and
    /// `SettingsError::NotFound` if the session is not declared in the
    /// settings.
    pub fn from_settings(
        settings: &SessionSettings,
        session_id: &SessionId,
        role: SessionRole,
    ) -> Result<Self, SettingsError> {
        if !settings.contains(session_id) {
            return Err(SettingsError::not_found(format!(
                "session {session_id} is not declared"
            )));
        }

        if let Some(declared) = settings.get(session_id, "ConnectionType") {
            let declared_role: SessionRole =
                declared.parse().map_err(|_| SettingsError::InvalidValue {
                    key: "ConnectionType",
                    value: declared.to_string(),
                })?;
            if declared_role != role {
                warn!(session = %session_id, declared = %declared_role, expected = %role, "connection type mismatch");
            }
        }

        let secs = |key: &'static str, default: u64| -> Result<Duration, SettingsError> {
            Ok(Duration::from_secs(
                settings.get_u64(session_id, key)?.unwrap_or(default),
            ))
        };
        let flag = |key: &'static str| -> Result<bool, SettingsError> {
            Ok(settings.get_bool(session_id, key)?.unwrap_or(false))
        };

        let mut config = Self::new(session_id.clone(), role);
        config.heartbeat_interval = secs("HeartBtInt", DEFAULT_HEARTBEAT_SECS)?;
        config.reset_on_logon = flag("ResetOnLogon")?;
        config.reset_on_logout = flag("ResetOnLogout")?;
        config.reset_on_disconnect = flag("ResetOnDisconnect")?;
        config.logon_timeout = secs("LogonTimeout", DEFAULT_TIMEOUT_SECS)?;
        config.logout_timeout = secs("LogoutTimeout", DEFAULT_TIMEOUT_SECS)?;
        config.endpoint = endpoint(settings, session_id, role)?;
        Ok(config)
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the endpoint.
    ///
    /// # Arguments
    /// * `host` - Host to bind (acceptor) or connect to (initiator)
    /// * `port` - TCP port
    #[must_use]
    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.endpoint = Some(SocketEndpoint {
            host: host.into(),
            port,
        });
        self
    }

    /// Returns the heartbeat interval in seconds.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }
}

fn endpoint(
    settings: &SessionSettings,
    session_id: &SessionId,
    role: SessionRole,
) -> Result<Option<SocketEndpoint>, SettingsError> {
    let (host_key, port_key) = match role {
        SessionRole::Acceptor => ("SocketAcceptAddress", "SocketAcceptPort"),
        SessionRole::Initiator => ("SocketConnectHost", "SocketConnectPort"),
    };
    let Some(port) = settings.get_u64(session_id, port_key)? else {
        return Ok(None);
    };
    let port = u16::try_from(port).map_err(|_| SettingsError::InvalidValue {
        key: port_key,
        value: port.to_string(),
    })?;
    let host = match (settings.get(session_id, host_key), role) {
        (Some(host), _) => host.to_string(),
        (None, SessionRole::Acceptor) => DEFAULT_ACCEPT_ADDRESS.to_string(),
        (None, SessionRole::Initiator) => {
            return Err(SettingsError::InvalidValue {
                key: "SocketConnectHost",
                value: String::new(),
            });
        }
    };
    Ok(Some(SocketEndpoint { host, port }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfix_core::CompId;

    fn id(begin: &str) -> SessionId {
        SessionId::new(
            begin,
            CompId::new("EXEC").unwrap(),
            CompId::new("BANZAI").unwrap(),
        )
    }

    const ACCEPTOR: &str = "\
[DEFAULT]
ConnectionType=acceptor
SenderCompID=EXEC
TargetCompID=BANZAI
SocketAcceptPort=9876
ResetOnLogon=Y

[SESSION]
BeginString=FIX.4.4
HeartBtInt=20

[SESSION]
BeginString=FIX.4.2
";

    #[test]
    fn test_session_config_new() {
        let config = SessionConfig::new(id("FIX.4.4"), SessionRole::Acceptor);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.heartbeat_interval_secs(), 30);
        assert!(!config.reset_on_logon);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_from_settings_acceptor() {
        let settings: SessionSettings = ACCEPTOR.parse().unwrap();
        let config =
            SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Acceptor).unwrap();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(20));
        assert!(config.reset_on_logon);
        assert!(!config.reset_on_disconnect);
        assert_eq!(config.endpoint.unwrap().to_string(), "0.0.0.0:9876");

        let legacy =
            SessionConfig::from_settings(&settings, &id("FIX.4.2"), SessionRole::Acceptor).unwrap();
        assert_eq!(legacy.heartbeat_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_from_settings_initiator_requires_host() {
        let doc = "[SESSION]\nBeginString=FIX.4.4\nSenderCompID=EXEC\nTargetCompID=BANZAI\nSocketConnectPort=9876\n";
        let settings: SessionSettings = doc.parse().unwrap();
        let err = SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Initiator)
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                key: "SocketConnectHost",
                ..
            }
        ));
    }

    #[test]
    fn test_from_settings_rejects_bad_values() {
        let doc = "[SESSION]\nBeginString=FIX.4.4\nSenderCompID=EXEC\nTargetCompID=BANZAI\nSocketAcceptPort=70000\n";
        let settings: SessionSettings = doc.parse().unwrap();
        assert!(SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Acceptor).is_err());

        let doc = "[SESSION]\nBeginString=FIX.4.4\nSenderCompID=EXEC\nTargetCompID=BANZAI\nHeartBtInt=soon\n";
        let settings: SessionSettings = doc.parse().unwrap();
        assert!(SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Acceptor).is_err());
    }

    #[test]
    fn test_from_settings_connection_type() {
        let doc = "[SESSION]\nConnectionType=Initiator\nBeginString=FIX.4.4\nSenderCompID=EXEC\nTargetCompID=BANZAI\n";
        let settings: SessionSettings = doc.parse().unwrap();
        let config =
            SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Acceptor).unwrap();
        assert_eq!(config.role, SessionRole::Acceptor);

        let doc = "[SESSION]\nConnectionType=both\nBeginString=FIX.4.4\nSenderCompID=EXEC\nTargetCompID=BANZAI\n";
        let settings: SessionSettings = doc.parse().unwrap();
        let err = SessionConfig::from_settings(&settings, &id("FIX.4.4"), SessionRole::Acceptor)
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                key: "ConnectionType",
                ..
            }
        ));
    }

    #[test]
    fn test_from_settings_unknown_session() {
        let settings: SessionSettings = ACCEPTOR.parse().unwrap();
        let err = SessionConfig::from_settings(&settings, &id("FIX.4.0"), SessionRole::Acceptor)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_with_endpoint() {
        let config = SessionConfig::new(id("FIX.4.4"), SessionRole::Initiator)
            .with_endpoint("localhost", 9880)
            .with_heartbeat_interval(Duration::from_secs(5));
        assert_eq!(config.endpoint.as_ref().unwrap().to_string(), "localhost:9880");
        assert_eq!(config.heartbeat_interval_secs(), 5);
    }
}
