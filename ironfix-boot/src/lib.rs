/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Boot
//!
//! Settings resolution and session introspection for FIX services.
//!
//! IronFix Boot locates the session settings of a FIX engine from a
//! prioritized list of places, builds the engine's session tables from them
//! and exposes read-only session status over HTTP management endpoints.
//!
//! ## Features
//!
//! - **Prioritized settings**: application location, environment override,
//!   filesystem default and bundled default, first existing one wins
//! - **Explicit activation**: acceptor and initiator roles are enabled in the
//!   service configuration; a disabled role has no endpoint at all
//! - **Consistent snapshots**: every introspection read is a single view of
//!   the live session table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironfix_boot::prelude::*;
//!
//! let config = ServiceConfig::from_toml("[server]\nenabled = true\n")?;
//! let engine = EngineBuilder::from_config(config)
//!     .with_bundled(ironfix_boot::bundled_resources())
//!     .build()?;
//! let app = router(engine.endpoints().clone(), DEFAULT_BASE_PATH);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Error taxonomy, session identity and core types
//! - [`settings`]: Settings documents, resources and the settings locator
//! - [`session`]: Session descriptors, tables and per-session configuration
//! - [`actuator`]: Management endpoints and their HTTP router
//! - [`engine`]: Service configuration and engine assembly

use ironfix_core::error::FixError;
use ironfix_engine::{EngineBuilder, ServiceConfig};
use ironfix_settings::{BundledResources, SystemProperties};
use std::future::Future;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod core {
    //! Error taxonomy, session identity and core types.
    pub use ironfix_core::*;
}

pub mod settings {
    //! Settings documents, resources and the settings locator.
    pub use ironfix_settings::*;
}

pub mod session {
    //! Session descriptors, tables and per-session configuration.
    pub use ironfix_session::*;
}

pub mod actuator {
    //! Management endpoints and their HTTP router.
    pub use ironfix_actuator::*;
}

pub mod engine {
    //! Service configuration and engine assembly.
    pub use ironfix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ironfix_core::{
        ActuatorError, CompId, FixError, Result, SessionError, SessionId, SettingsError, Timestamp,
    };

    // Settings
    pub use ironfix_settings::{
        BundledResources, ConfigSource, LoadedSettings, MapProperties, PropertySource,
        SessionSettings, SettingsLocations, SettingsLocator, SystemProperties, resolve,
    };

    // Session
    pub use ironfix_session::{
        SessionConfig, SessionDescriptor, SessionRegistry, SessionRole, SessionTable,
    };

    // Actuator
    pub use ironfix_actuator::{
        DEFAULT_BASE_PATH, Endpoint, EndpointRegistry, SessionsEndpoint, router, serve,
    };

    // Engine
    pub use ironfix_engine::{Engine, EngineBuilder, ServiceConfig};
}

/// Environment variable naming the service configuration file.
pub const CONFIG_ENV: &str = "IRONFIX_CONFIG";
/// Service configuration file used when [`CONFIG_ENV`] is not set.
pub const DEFAULT_CONFIG_FILE: &str = "ironfix.toml";

/// Returns the settings documents shipped with the binary.
#[must_use]
pub fn bundled_resources() -> BundledResources {
    BundledResources::new()
        .with_resource(
            "fix-server.cfg",
            include_str!("../resources/fix-server.cfg"),
        )
        .with_resource(
            "fix-client.cfg",
            include_str!("../resources/fix-client.cfg"),
        )
}

/// Collects `-Dname=value` arguments into a property source.
///
/// The pairs shadow the process environment for settings location overrides
/// and `${name}` interpolation. Other arguments are ignored.
///
/// # Arguments
/// * `args` - Command line arguments, without the program name
#[must_use]
pub fn system_properties<I, S>(args: I) -> SystemProperties
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<S> = args.into_iter().collect();
    SystemProperties::new().with_pairs(
        args.iter()
            .filter_map(|arg| arg.as_ref().strip_prefix("-D")),
    )
}

/// Initializes logging.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Builds the engine, serves the management endpoints until `shutdown`
/// resolves, then shuts the engine down.
///
/// # Arguments
/// * `config` - Service configuration
/// * `properties` - Property overrides, see [`system_properties`]
/// * `shutdown` - Future resolving when the service should stop
///
/// # Errors
/// Returns `FixError::Settings` if an enabled role has no usable settings,
/// and `FixError::Io` if the management address cannot be bound.
pub async fn run(
    config: ServiceConfig,
    properties: SystemProperties,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), FixError> {
    let actuator = config.actuator.clone();
    let mut engine = EngineBuilder::from_config(config)
        .with_bundled(bundled_resources())
        .with_properties(Arc::new(properties))
        .build()?;

    let served = if actuator.enabled {
        let app = ironfix_actuator::router(engine.endpoints().clone(), &actuator.base_path);
        ironfix_actuator::serve(&actuator.bind, app, shutdown).await
    } else {
        info!("management endpoints disabled");
        shutdown.await;
        Ok(())
    };

    engine.shutdown();
    served
}
