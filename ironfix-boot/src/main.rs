/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! IronFix Boot service.
//!
//! Reads the service configuration from `$IRONFIX_CONFIG` (or `ironfix.toml`
//! in the working directory), assembles the engine and serves the management
//! endpoints until Ctrl-C. `-Dname=value` arguments override properties such
//! as `IRONFIX_SERVER_CONFIG`.

use anyhow::Context;
use ironfix_boot::{CONFIG_ENV, DEFAULT_CONFIG_FILE, init_logging, run, system_properties};
use ironfix_engine::ServiceConfig;
use ironfix_engine::config::{BIND_ENV, LOG_LEVEL_ENV};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = env::var(CONFIG_ENV).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    let found = path.is_file();
    let config = if found {
        ServiceConfig::load(&path)
            .with_context(|| format!("cannot load service configuration {}", path.display()))?
    } else {
        let bind = env::var(BIND_ENV).ok();
        let level = env::var(LOG_LEVEL_ENV).ok();
        ServiceConfig::default().with_overrides(bind.as_deref(), level.as_deref())
    };

    init_logging(&config.log.level);
    if found {
        info!(path = %path.display(), "service configuration loaded");
    } else {
        warn!(path = %path.display(), "service configuration not found, using defaults");
    }

    let properties = system_properties(env::args().skip(1));
    run(config, properties, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    })
    .await
    .context("ironfix-boot failed")
}
