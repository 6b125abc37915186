/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Session
//!
//! Session bookkeeping for the IronFix engine.
//!
//! This crate provides:
//! - **Descriptors**: Read-only snapshots of a session's identity and status
//! - **Registry**: The live session table mutated by the engine and read by introspection
//! - **Configuration**: Per-session runtime options derived from the settings document

pub mod config;
pub mod descriptor;
pub mod registry;

pub use config::{SessionConfig, SocketEndpoint};
pub use descriptor::{SessionDescriptor, SessionRole};
pub use registry::{SessionRegistry, SessionTable};
