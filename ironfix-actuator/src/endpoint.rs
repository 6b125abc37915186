/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Endpoint trait and registry.
//!
//! An endpoint only exists for callers while an [`EndpointRegistration`] for
//! it is alive. Components that are not enabled never register anything, so
//! discovery does not list them and lookups behave as for any unknown id.

use ironfix_core::error::ActuatorError;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// A read-only management endpoint.
pub trait Endpoint: Send + Sync {
    /// Unique endpoint id, used as the URL segment.
    fn id(&self) -> &str;

    /// Returns the full endpoint payload.
    fn read(&self) -> Value;

    /// Returns the part of the payload named by `selector`.
    ///
    /// # Errors
    /// Returns `ActuatorError::NotFound` if nothing matches, or
    /// `ActuatorError::InvalidSelector` if the selector is malformed.
    fn read_selector(&self, selector: &str) -> Result<Value, ActuatorError> {
        Err(ActuatorError::NotFound(selector.to_string()))
    }
}

type Entries = Vec<Arc<dyn Endpoint>>;

/// Shared, thread-safe set of registered endpoints.
///
/// Cloning yields another handle to the same set.
#[derive(Clone, Default)]
pub struct EndpointRegistry {
    entries: Arc<RwLock<Entries>>,
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl EndpointRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint.
    ///
    /// The endpoint stays registered until the returned registration is
    /// dropped or [`deregister`](EndpointRegistration::deregister)ed.
    ///
    /// # Errors
    /// Returns `ActuatorError::DuplicateEndpoint` if the id is taken.
    pub fn register(&self, endpoint: Arc<dyn Endpoint>) -> Result<EndpointRegistration, ActuatorError> {
        let id = endpoint.id().to_string();
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.id() == id) {
            return Err(ActuatorError::DuplicateEndpoint(id));
        }
        entries.push(endpoint);
        info!(endpoint = %id, "management endpoint registered");
        Ok(EndpointRegistration {
            id,
            entries: Arc::clone(&self.entries),
        })
    }

    /// Returns registered endpoint ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.id().to_string()).collect()
    }

    /// Returns true if an endpoint with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().iter().any(|e| e.id() == id)
    }

    /// Returns the endpoint registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn Endpoint>> {
        self.entries.read().iter().find(|e| e.id() == id).cloned()
    }

    /// Reads the endpoint registered under `id`.
    ///
    /// # Errors
    /// Returns `ActuatorError::UnknownEndpoint` if it is not registered.
    pub fn invoke(&self, id: &str) -> Result<Value, ActuatorError> {
        self.get(id)
            .map(|endpoint| endpoint.read())
            .ok_or_else(|| ActuatorError::UnknownEndpoint(id.to_string()))
    }
}

/// Keeps an endpoint registered for as long as it lives.
#[must_use = "dropping the registration removes the endpoint"]
pub struct EndpointRegistration {
    id: String,
    entries: Arc<RwLock<Entries>>,
}

impl fmt::Debug for EndpointRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistration")
            .field("id", &self.id)
            .finish()
    }
}

impl EndpointRegistration {
    /// Returns the id of the registered endpoint.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Removes the endpoint now.
    pub fn deregister(self) {
        drop(self);
    }
}

impl Drop for EndpointRegistration {
    fn drop(&mut self) {
        self.entries.write().retain(|e| e.id() != self.id);
        info!(endpoint = %self.id, "management endpoint removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str);

    impl Endpoint for Fixed {
        fn id(&self) -> &str {
            self.0
        }

        fn read(&self) -> Value {
            json!({ "id": self.0 })
        }
    }

    #[test]
    fn test_register_and_invoke() {
        let registry = EndpointRegistry::new();
        let _a = registry.register(Arc::new(Fixed("a"))).unwrap();
        let _b = registry.register(Arc::new(Fixed("b"))).unwrap();

        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert_eq!(registry.invoke("b").unwrap(), json!({ "id": "b" }));
        assert_eq!(
            registry.invoke("c"),
            Err(ActuatorError::UnknownEndpoint("c".to_string()))
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = EndpointRegistry::new();
        let _a = registry.register(Arc::new(Fixed("a"))).unwrap();
        let err = registry.register(Arc::new(Fixed("a"))).unwrap_err();
        assert_eq!(err, ActuatorError::DuplicateEndpoint("a".to_string()));
    }

    #[test]
    fn test_registration_drop_removes_endpoint() {
        let registry = EndpointRegistry::new();
        let registration = registry.register(Arc::new(Fixed("a"))).unwrap();
        assert_eq!(registration.id(), "a");
        let clone = registry.clone();

        registration.deregister();
        assert!(!clone.contains("a"));
        assert!(clone.get("a").is_none());
        assert!(clone.ids().is_empty());

        // The id can be reused once released.
        let _again = registry.register(Arc::new(Fixed("a"))).unwrap();
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_default_selector_is_not_found() {
        let endpoint = Fixed("a");
        assert_eq!(
            endpoint.read_selector("x"),
            Err(ActuatorError::NotFound("x".to_string()))
        );
    }
}
