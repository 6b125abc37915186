/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # IronFix Settings
//!
//! Session settings for the IronFix engine.
//!
//! This crate provides:
//! - **Settings document**: QuickFIX-style `[DEFAULT]`/`[SESSION]` settings model and parser
//! - **Resources**: Filesystem, glob and bundled resources behind one capability trait
//! - **Property sources**: System property overrides layered over the process environment
//! - **Locator**: Prioritized resolution of the settings file from four candidate sources

pub mod document;
pub mod locator;
pub mod properties;
pub mod resource;

pub use document::{Properties, SessionSettings};
pub use locator::{ConfigSource, LoadedSettings, SettingsLocations, SettingsLocator, resolve};
pub use properties::{MapProperties, PropertySource, SystemProperties};
pub use resource::{BundledResources, FileResource, Resource, ResourceResolver};
