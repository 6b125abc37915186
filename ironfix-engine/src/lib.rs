/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Engine
//!
//! Composition root of an IronFix service.
//!
//! This crate provides:
//! - **Service configuration**: TOML role and actuator settings with
//!   environment overrides
//! - **Builder API**: Resolves session settings per enabled role and wires
//!   session tables to management endpoints
//! - **Engine**: Owns the assembled state until shutdown

pub mod builder;
pub mod config;

pub use builder::{Engine, EngineBuilder, endpoint_id};
pub use config::{ActuatorConfig, LogConfig, RoleConfig, ServiceConfig};
