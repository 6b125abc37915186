/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Actuator
//!
//! Read-only management endpoints for the IronFix engine.
//!
//! This crate provides:
//! - **Endpoint registry**: Capability discovery with scoped registrations
//! - **Sessions endpoint**: Snapshot introspection of the live session table
//! - **HTTP surface**: An axum router exposing registered endpoints as JSON

pub mod endpoint;
pub mod http;
pub mod sessions;

pub use endpoint::{Endpoint, EndpointRegistration, EndpointRegistry};
pub use http::{DEFAULT_BASE_PATH, router, serve};
pub use sessions::{CLIENT_ENDPOINT_ID, SERVER_ENDPOINT_ID, SessionsEndpoint};
