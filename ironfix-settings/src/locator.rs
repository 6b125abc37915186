/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Prioritized settings resolution.
//!
//! Settings are looked up in four places, in this order, and the first one
//! that exists wins:
//!
//! 1. the location given by the application configuration,
//! 2. the location named by a system property / environment variable,
//! 3. a default path on the filesystem,
//! 4. a default bundled resource.
//!
//! Once a source exists it is read and parsed; a read or parse failure at
//! that point fails the whole resolution instead of falling through.

use crate::document::SessionSettings;
use crate::properties::{PropertySource, SystemProperties};
use crate::resource::{BundledResources, Resource, ResourceResolver};
use ironfix_core::error::SettingsError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable naming the acceptor settings location.
pub const SERVER_CONFIG_PROPERTY: &str = "IRONFIX_SERVER_CONFIG";
/// Default filesystem location of the acceptor settings.
pub const SERVER_CONFIG_FILE: &str = "./fix-server.cfg";
/// Default bundled location of the acceptor settings.
pub const SERVER_CONFIG_BUNDLED: &str = "classpath:fix-server.cfg";
/// Environment variable naming the initiator settings location.
pub const CLIENT_CONFIG_PROPERTY: &str = "IRONFIX_CLIENT_CONFIG";
/// Default filesystem location of the initiator settings.
pub const CLIENT_CONFIG_FILE: &str = "./fix-client.cfg";
/// Default bundled location of the initiator settings.
pub const CLIENT_CONFIG_BUNDLED: &str = "classpath:fix-client.cfg";

/// Candidate settings sources, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigSource {
    /// Location set in the application configuration.
    ApplicationProperty,
    /// Location read from a named system property or environment variable.
    EnvironmentOverride,
    /// Conventional path on the filesystem.
    FilesystemDefault,
    /// Resource bundled with the application.
    BundledDefault,
}

impl ConfigSource {
    /// All sources in priority order.
    pub const ALL: [Self; 4] = [
        Self::ApplicationProperty,
        Self::EnvironmentOverride,
        Self::FilesystemDefault,
        Self::BundledDefault,
    ];

    /// Returns a short label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ApplicationProperty => "application property",
            Self::EnvironmentOverride => "system property",
            Self::FilesystemDefault => "default filesystem location",
            Self::BundledDefault => "default bundled location",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four location inputs of a resolution.
///
/// `environment_override` holds the *name* of the property whose value is
/// the location; the other three are locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLocations {
    /// Location from the application configuration.
    pub application_property: Option<String>,
    /// Name of the system property / environment variable.
    pub environment_override: Option<String>,
    /// Default filesystem location.
    pub filesystem_path: Option<String>,
    /// Default bundled location.
    pub classpath_path: Option<String>,
}

impl SettingsLocations {
    /// Creates locations from the four raw inputs.
    #[must_use]
    pub fn new(
        application_property: Option<&str>,
        environment_override: Option<&str>,
        filesystem_path: Option<&str>,
        classpath_path: Option<&str>,
    ) -> Self {
        let own = |s: Option<&str>| s.map(str::to_string);
        Self {
            application_property: own(application_property),
            environment_override: own(environment_override),
            filesystem_path: own(filesystem_path),
            classpath_path: own(classpath_path),
        }
    }

    /// Default locations for an acceptor.
    #[must_use]
    pub fn acceptor() -> Self {
        Self::new(
            None,
            Some(SERVER_CONFIG_PROPERTY),
            Some(SERVER_CONFIG_FILE),
            Some(SERVER_CONFIG_BUNDLED),
        )
    }

    /// Default locations for an initiator.
    #[must_use]
    pub fn initiator() -> Self {
        Self::new(
            None,
            Some(CLIENT_CONFIG_PROPERTY),
            Some(CLIENT_CONFIG_FILE),
            Some(CLIENT_CONFIG_BUNDLED),
        )
    }

    /// Sets the application property location.
    #[must_use]
    pub fn with_application_property(mut self, location: impl Into<String>) -> Self {
        self.application_property = Some(location.into());
        self
    }

    /// Returns the raw input for a source.
    #[must_use]
    pub fn input(&self, source: ConfigSource) -> Option<&str> {
        let value = match source {
            ConfigSource::ApplicationProperty => &self.application_property,
            ConfigSource::EnvironmentOverride => &self.environment_override,
            ConfigSource::FilesystemDefault => &self.filesystem_path,
            ConfigSource::BundledDefault => &self.classpath_path,
        };
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    /// The source that won.
    pub source: ConfigSource,
    /// The location the settings were read from.
    pub location: String,
    /// The parsed settings.
    pub settings: SessionSettings,
}

/// Resolves settings from the prioritized sources.
#[derive(Clone)]
pub struct SettingsLocator {
    resolver: ResourceResolver,
    properties: Arc<dyn PropertySource>,
}

impl fmt::Debug for SettingsLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsLocator")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Default for SettingsLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLocator {
    /// Creates a locator with no bundled resources that reads the process
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolver: ResourceResolver::default(),
            properties: Arc::new(SystemProperties::new()),
        }
    }

    /// Sets the bundled resource catalog.
    #[must_use]
    pub fn with_bundled(mut self, bundled: BundledResources) -> Self {
        self.resolver = ResourceResolver::new(bundled);
        self
    }

    /// Sets the property source used for the environment override and for
    /// `${name}` interpolation.
    #[must_use]
    pub fn with_properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.properties = properties;
        self
    }

    /// Resolves and parses the settings.
    ///
    /// # Errors
    /// Returns `SettingsError::NotFound` when no source exists, or when the
    /// winning source cannot be read or parsed (the failure is kept as the
    /// error source).
    pub fn load(&self, locations: &SettingsLocations) -> Result<LoadedSettings, SettingsError> {
        for source in ConfigSource::ALL {
            let Some(location) = self.location_for(source, locations) else {
                continue;
            };
            let Some(resource) = self.resolver.resolve(&location) else {
                debug!(%source, %location, "settings location did not resolve");
                continue;
            };
            if !resource.exists() {
                debug!(%source, resource = %resource.description(), "settings not found");
                continue;
            }

            info!(%source, %location, "loading settings");
            let settings = self.read(resource.as_ref())?;
            return Ok(LoadedSettings {
                source,
                location,
                settings,
            });
        }

        Err(SettingsError::not_found("settings file not found"))
    }

    fn location_for(&self, source: ConfigSource, locations: &SettingsLocations) -> Option<String> {
        let Some(input) = locations.input(source) else {
            debug!(%source, "no location configured");
            return None;
        };
        if source != ConfigSource::EnvironmentOverride {
            return Some(input.to_string());
        }
        match self.properties.property(input) {
            Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => {
                debug!(property = %input, "could not find system property");
                None
            }
        }
    }

    fn read(&self, resource: &dyn Resource) -> Result<SessionSettings, SettingsError> {
        let description = resource.description();
        let reader = resource.open().map_err(|e| {
            SettingsError::not_found_caused_by(format!("cannot open {description}"), e)
        })?;
        SessionSettings::parse(reader, self.properties.as_ref()).map_err(|e| {
            SettingsError::not_found_caused_by(format!("cannot load {description}"), e)
        })
    }
}

/// Resolves settings from the four raw inputs.
///
/// `classpath:` locations are looked up in `bundled`; the environment
/// override is read from the process environment.
///
/// # Arguments
/// * `application_property` - Location from the application configuration
/// * `environment_override_name` - Name of the variable holding a location
/// * `filesystem_path` - Default filesystem location
/// * `classpath_path` - Default bundled location
/// * `bundled` - Resources shipped with the application
///
/// # Errors
/// See [`SettingsLocator::load`].
pub fn resolve(
    application_property: Option<&str>,
    environment_override_name: Option<&str>,
    filesystem_path: Option<&str>,
    classpath_path: Option<&str>,
    bundled: &BundledResources,
) -> Result<SessionSettings, SettingsError> {
    let locations = SettingsLocations::new(
        application_property,
        environment_override_name,
        filesystem_path,
        classpath_path,
    );
    SettingsLocator::new()
        .with_bundled(bundled.clone())
        .load(&locations)
        .map(|loaded| loaded.settings)
}
