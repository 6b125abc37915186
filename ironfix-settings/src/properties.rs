/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Named property lookup.
//!
//! Property sources answer "what is the value of X?" for the environment
//! override step of settings resolution and for `${X}` interpolation inside
//! settings documents.

use std::collections::HashMap;
use std::env;

/// Source of named string properties.
pub trait PropertySource: Send + Sync {
    /// Returns the value of the named property, if set.
    fn property(&self, name: &str) -> Option<String>;
}

/// In-process property overrides layered over the process environment.
///
/// Overrides take precedence. A name missing from the overrides is looked up
/// with [`std::env::var`].
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    overrides: HashMap<String, String>,
}

impl SystemProperties {
    /// Creates a property source backed by the process environment only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override that shadows the process environment.
    #[must_use]
    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    /// Parses `name=value` pairs into overrides, skipping malformed entries.
    #[must_use]
    pub fn with_pairs<'a>(mut self, pairs: impl IntoIterator<Item = &'a str>) -> Self {
        for pair in pairs {
            if let Some((name, value)) = pair.split_once('=') {
                self.overrides
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        self
    }
}

impl PropertySource for SystemProperties {
    fn property(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| env::var(name).ok())
    }
}

/// Plain in-memory property map.
#[derive(Debug, Clone, Default)]
pub struct MapProperties {
    values: HashMap<String, String>,
}

impl MapProperties {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl PropertySource for MapProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
