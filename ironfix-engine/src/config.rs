/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Service configuration.
//!
//! A small TOML file decides which engine roles run and whether their
//! session endpoints are exposed:
//!
//! ```toml
//! [server]
//! enabled = true
//! config = "file:/etc/ironfix/fix-server.cfg"
//!
//! [client]
//! enabled = false
//!
//! [actuator]
//! bind = "127.0.0.1:8081"
//! base_path = "/actuator"
//! exposure = ["fixserver"]
//!
//! [log]
//! level = "info"
//! ```
//!
//! `IRONFIX_BIND` and `IRONFIX_LOG_LEVEL` override the corresponding values
//! after the file is read.

use ironfix_actuator::DEFAULT_BASE_PATH;
use ironfix_core::error::FixError;
use ironfix_session::SessionRole;
use ironfix_settings::SettingsLocations;
use serde::Deserialize;
use std::path::Path;
use std::{env, fs};

/// Environment variable overriding the actuator bind address.
pub const BIND_ENV: &str = "IRONFIX_BIND";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "IRONFIX_LOG_LEVEL";
/// Default actuator bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8081";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Acceptor role.
    pub server: RoleConfig,
    /// Initiator role.
    pub client: RoleConfig,
    /// Management endpoints.
    pub actuator: ActuatorConfig,
    /// Logging.
    pub log: LogConfig,
}

/// Configuration of one engine role.
///
/// `enabled` is the activation declaration: a role that is not enabled
/// resolves no settings and registers no endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleConfig {
    /// Whether the role runs.
    pub enabled: bool,
    /// Settings location set by the application.
    pub config: Option<String>,
    /// Name of the property holding an override location.
    pub config_property: Option<String>,
    /// Default filesystem location.
    pub config_file: Option<String>,
    /// Default bundled location.
    pub config_bundled: Option<String>,
}

impl RoleConfig {
    /// Returns an enabled role with default locations.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Sets the application settings location.
    #[must_use]
    pub fn with_config(mut self, location: impl Into<String>) -> Self {
        self.config = Some(location.into());
        self
    }

    /// Returns the settings locations for `role`, starting from the role
    /// defaults and applying the configured overrides.
    #[must_use]
    pub fn locations(&self, role: SessionRole) -> SettingsLocations {
        let mut locations = match role {
            SessionRole::Acceptor => SettingsLocations::acceptor(),
            SessionRole::Initiator => SettingsLocations::initiator(),
        };
        locations.application_property.clone_from(&self.config);
        if let Some(name) = &self.config_property {
            locations.environment_override = Some(name.clone());
        }
        if let Some(path) = &self.config_file {
            locations.filesystem_path = Some(path.clone());
        }
        if let Some(path) = &self.config_bundled {
            locations.classpath_path = Some(path.clone());
        }
        locations
    }
}

/// Management endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Whether management endpoints are registered and served at all.
    pub enabled: bool,
    /// HTTP bind address.
    pub bind: String,
    /// Base path of the management routes.
    pub base_path: String,
    /// Endpoint ids to expose; `None` exposes all, `"*"` matches any id.
    pub exposure: Option<Vec<String>>,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: DEFAULT_BIND.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            exposure: None,
        }
    }
}

impl ActuatorConfig {
    /// Returns true if the endpoint `id` should be registered.
    #[must_use]
    pub fn is_exposed(&self, id: &str) -> bool {
        self.enabled
            && self
                .exposure
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|e| e == "*" || e == id))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default log filter directive.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration file and applies environment overrides.
    ///
    /// # Errors
    /// Returns `FixError::Io` if the file cannot be read, or
    /// `FixError::Configuration` if it is not valid.
    pub fn load(path: &Path) -> Result<Self, FixError> {
        let bind = env::var(BIND_ENV).ok();
        let level = env::var(LOG_LEVEL_ENV).ok();
        Ok(Self::load_file(path)?.with_overrides(bind.as_deref(), level.as_deref()))
    }

    /// Reads the configuration file without environment overrides.
    ///
    /// # Errors
    /// Returns `FixError::Io` if the file cannot be read, or
    /// `FixError::Configuration` if it is not valid.
    pub fn load_file(path: &Path) -> Result<Self, FixError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
            .map_err(|e| FixError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    /// Returns `FixError::Configuration` for invalid TOML or unknown keys.
    pub fn from_toml(raw: &str) -> Result<Self, FixError> {
        toml::from_str(raw).map_err(|e| FixError::Configuration(e.to_string()))
    }

    /// Applies bind and log level overrides; empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, bind: Option<&str>, level: Option<&str>) -> Self {
        if let Some(bind) = bind.map(str::trim).filter(|s| !s.is_empty()) {
            self.actuator.bind = bind.to_string();
        }
        if let Some(level) = level.map(str::trim).filter(|s| !s.is_empty()) {
            self.log.level = level.to_string();
        }
        self
    }

    /// Returns the configuration of `role`.
    #[must_use]
    pub const fn role(&self, role: SessionRole) -> &RoleConfig {
        match role {
            SessionRole::Acceptor => &self.server,
            SessionRole::Initiator => &self.client,
        }
    }
}
