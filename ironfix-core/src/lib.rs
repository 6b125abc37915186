/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Core
//!
//! Core types and error definitions shared by the IronFix settings, session
//! registry and management crates.
//!
//! This crate provides:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Core types**: `CompId`, `Timestamp`
//! - **Session identity**: `SessionId` and its canonical key format

pub mod error;
pub mod session_id;
pub mod types;

pub use error::{ActuatorError, FixError, Result, SessionError, SettingsError};
pub use session_id::{SessionId, is_key_safe};
pub use types::{CompId, Timestamp};
