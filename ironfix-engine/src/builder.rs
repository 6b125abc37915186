/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Engine assembly.
//!
//! [`EngineBuilder::build`] is the only place where the activation
//! declarations are checked. For each enabled role it resolves the settings,
//! fills the role's session table and, when exposed, registers the sessions
//! endpoint. A disabled role leaves no trace: no settings are read and no
//! endpoint is registered.

use crate::config::ServiceConfig;
use ironfix_actuator::{
    CLIENT_ENDPOINT_ID, EndpointRegistration, EndpointRegistry, SERVER_ENDPOINT_ID,
    SessionsEndpoint,
};
use ironfix_core::error::FixError;
use ironfix_session::{SessionConfig, SessionRegistry, SessionRole, SessionTable};
use ironfix_settings::{
    BundledResources, ConfigSource, PropertySource, SessionSettings, SettingsLocator,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for an [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    config: ServiceConfig,
    locator: SettingsLocator,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::from_config(ServiceConfig::default())
    }
}

impl EngineBuilder {
    /// Creates a builder from the service configuration.
    #[must_use]
    pub fn from_config(config: ServiceConfig) -> Self {
        Self {
            config,
            locator: SettingsLocator::new(),
        }
    }

    /// Sets the bundled resources used for `classpath:` locations.
    #[must_use]
    pub fn with_bundled(mut self, bundled: BundledResources) -> Self {
        self.locator = self.locator.with_bundled(bundled);
        self
    }

    /// Sets the property source used for location overrides and settings
    /// interpolation.
    #[must_use]
    pub fn with_properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.locator = self.locator.with_properties(properties);
        self
    }

    /// Returns the service configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Assembles the engine.
    ///
    /// # Errors
    /// Returns `FixError::Settings` if an enabled role has no usable settings,
    /// or if a session's options are invalid. Nothing stays registered when
    /// this fails.
    pub fn build(self) -> Result<Engine, FixError> {
        let endpoints = EndpointRegistry::new();
        let mut roles = Vec::new();

        for role in [SessionRole::Acceptor, SessionRole::Initiator] {
            let role_config = self.config.role(role);
            if !role_config.enabled {
                debug!(%role, "role not enabled");
                continue;
            }

            let loaded = self.locator.load(&role_config.locations(role))?;
            info!(
                %role,
                source = %loaded.source,
                location = %loaded.location,
                sessions = loaded.settings.session_count(),
                "settings resolved"
            );
            let settings = Arc::new(loaded.settings);

            let session_configs = settings
                .session_ids()
                .map(|id| SessionConfig::from_settings(&settings, id, role))
                .collect::<Result<Vec<_>, _>>()?;

            let registry = Arc::new(SessionRegistry::new(role));
            registry.initialize(settings.session_ids().cloned())?;

            let id = endpoint_id(role);
            let registration = if self.config.actuator.is_exposed(id) {
                let table: Arc<dyn SessionTable> = registry.clone();
                let endpoint = SessionsEndpoint::new(id, table, Arc::clone(&settings));
                Some(endpoints.register(Arc::new(endpoint))?)
            } else {
                debug!(%role, endpoint = id, "endpoint not exposed");
                None
            };

            roles.push(RoleRuntime {
                role,
                source: loaded.source,
                settings,
                registry,
                session_configs,
                registration,
            });
        }

        info!(roles = roles.len(), endpoints = ?endpoints.ids(), "engine assembled");
        Ok(Engine { roles, endpoints })
    }
}

/// Returns the management endpoint id for a role.
#[must_use]
pub const fn endpoint_id(role: SessionRole) -> &'static str {
    match role {
        SessionRole::Acceptor => SERVER_ENDPOINT_ID,
        SessionRole::Initiator => CLIENT_ENDPOINT_ID,
    }
}

#[derive(Debug)]
struct RoleRuntime {
    role: SessionRole,
    source: ConfigSource,
    settings: Arc<SessionSettings>,
    registry: Arc<SessionRegistry>,
    session_configs: Vec<SessionConfig>,
    registration: Option<EndpointRegistration>,
}

/// An assembled engine.
///
/// Owns the session table of every enabled role and the registrations of
/// their endpoints.
#[derive(Debug)]
pub struct Engine {
    roles: Vec<RoleRuntime>,
    endpoints: EndpointRegistry,
}

impl Engine {
    /// Returns the session table of `role`, if the role is enabled.
    #[must_use]
    pub fn registry(&self, role: SessionRole) -> Option<Arc<SessionRegistry>> {
        self.runtime(role).map(|r| Arc::clone(&r.registry))
    }

    /// Returns the resolved settings of `role`.
    #[must_use]
    pub fn settings(&self, role: SessionRole) -> Option<&SessionSettings> {
        self.runtime(role).map(|r| r.settings.as_ref())
    }

    /// Returns which source the settings of `role` came from.
    #[must_use]
    pub fn settings_source(&self, role: SessionRole) -> Option<ConfigSource> {
        self.runtime(role).map(|r| r.source)
    }

    /// Returns the per-session configuration of `role`, in settings order.
    #[must_use]
    pub fn session_configs(&self, role: SessionRole) -> &[SessionConfig] {
        self.runtime(role)
            .map(|r| r.session_configs.as_slice())
            .unwrap_or_default()
    }

    /// Returns the enabled roles.
    pub fn roles(&self) -> impl Iterator<Item = SessionRole> + '_ {
        self.roles.iter().map(|r| r.role)
    }

    /// Returns the endpoint registry.
    #[must_use]
    pub const fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    /// Removes the endpoints and clears the session tables.
    ///
    /// Calling it again has no effect.
    pub fn shutdown(&mut self) {
        for runtime in &mut self.roles {
            if let Some(registration) = runtime.registration.take() {
                registration.deregister();
            }
            runtime.registry.clear();
        }
        info!("engine shut down");
    }

    fn runtime(&self, role: SessionRole) -> Option<&RoleRuntime> {
        self.roles.iter().find(|r| r.role == role)
    }
}
