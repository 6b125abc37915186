/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session introspection endpoint.
//!
//! [`SessionsEndpoint`] projects the engine's live session table into JSON.
//! Every call reads the table once and keeps nothing between calls.

use crate::endpoint::Endpoint;
use ironfix_core::SessionId;
use ironfix_core::error::ActuatorError;
use ironfix_session::{SessionDescriptor, SessionTable};
use ironfix_settings::SessionSettings;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Endpoint id for acceptor sessions.
pub const SERVER_ENDPOINT_ID: &str = "fixserver";
/// Endpoint id for initiator sessions.
pub const CLIENT_ENDPOINT_ID: &str = "fixclient";

/// Read-only view of the sessions of one engine.
pub struct SessionsEndpoint {
    id: String,
    table: Arc<dyn SessionTable>,
    settings: Arc<SessionSettings>,
}

impl std::fmt::Debug for SessionsEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionsEndpoint")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl SessionsEndpoint {
    /// Creates an endpoint over a session table.
    ///
    /// # Arguments
    /// * `id` - Endpoint id, `fixserver` or `fixclient`
    /// * `table` - Live session table of the role
    /// * `settings` - Settings whose per-session values are echoed in the payload
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        table: Arc<dyn SessionTable>,
        settings: Arc<SessionSettings>,
    ) -> Self {
        Self {
            id: id.into(),
            table,
            settings,
        }
    }

    /// Lists sessions in registration order.
    ///
    /// An engine that is not initialized yet has no sessions.
    #[must_use]
    pub fn list_sessions(&self) -> Vec<SessionDescriptor> {
        self.table.snapshot().unwrap_or_default()
    }

    /// Describes one session.
    ///
    /// # Errors
    /// Returns `ActuatorError::NotFound` if the session is not in the table.
    pub fn describe_session(&self, id: &SessionId) -> Result<SessionDescriptor, ActuatorError> {
        self.table
            .lookup(id)
            .ok_or_else(|| ActuatorError::NotFound(id.to_string()))
    }

    fn status(&self, descriptor: &SessionDescriptor) -> Value {
        let properties: Map<String, Value> = self
            .settings
            .session_properties(&descriptor.id)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        json!({
            "role": descriptor.role.to_string(),
            "connected": descriptor.connected,
            "lastActivity": descriptor.last_activity.map(|ts| ts.to_string()),
            "properties": properties,
        })
    }
}

impl Endpoint for SessionsEndpoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&self) -> Value {
        let sessions: Map<String, Value> = self
            .list_sessions()
            .iter()
            .map(|d| (d.key(), self.status(d)))
            .collect();
        Value::Object(sessions)
    }

    fn read_selector(&self, selector: &str) -> Result<Value, ActuatorError> {
        let id: SessionId = selector
            .parse()
            .map_err(|e: ironfix_core::SessionError| ActuatorError::InvalidSelector(e.to_string()))?;
        let descriptor = self.describe_session(&id)?;
        Ok(self.status(&descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfix_core::Timestamp;
    use ironfix_session::{SessionRegistry, SessionRole};

    const SETTINGS: &str = "\
[DEFAULT]
ConnectionType=acceptor
SenderCompID=EXEC
HeartBtInt=30

[SESSION]
BeginString=FIX.4.4
TargetCompID=BANZAI

[SESSION]
BeginString=FIX.4.2
TargetCompID=BANZAI
";

    fn fixture() -> (Arc<SessionRegistry>, SessionsEndpoint, Vec<SessionId>) {
        let settings: SessionSettings = SETTINGS.parse().unwrap();
        let ids: Vec<SessionId> = settings.session_ids().cloned().collect();
        let registry = Arc::new(SessionRegistry::new(SessionRole::Acceptor));
        let table: Arc<dyn SessionTable> = registry.clone();
        let endpoint = SessionsEndpoint::new(SERVER_ENDPOINT_ID, table, Arc::new(settings));
        (registry, endpoint, ids)
    }

    #[test]
    fn test_not_initialized_lists_nothing() {
        let (_registry, endpoint, ids) = fixture();
        assert!(endpoint.list_sessions().is_empty());
        assert_eq!(endpoint.read(), json!({}));
        assert_eq!(
            endpoint.describe_session(&ids[0]),
            Err(ActuatorError::NotFound(ids[0].to_string()))
        );
    }

    #[test]
    fn test_initialized_without_sessions() {
        let (registry, endpoint, _) = fixture();
        registry.initialize(Vec::new()).unwrap();
        assert!(endpoint.list_sessions().is_empty());
    }

    #[test]
    fn test_list_in_registration_order() {
        let (registry, endpoint, ids) = fixture();
        registry.initialize(ids.iter().rev().cloned()).unwrap();
        let listed: Vec<SessionId> = endpoint.list_sessions().into_iter().map(|d| d.id).collect();
        assert_eq!(listed, vec![ids[1].clone(), ids[0].clone()]);
    }

    #[test]
    fn test_read_payload() {
        let (registry, endpoint, ids) = fixture();
        registry.initialize(ids.clone()).unwrap();
        registry.on_connect(&ids[0]).unwrap();
        registry.touch(&ids[0], Timestamp::from_millis(0)).unwrap();

        let payload = endpoint.read();
        let object = payload.as_object().unwrap();
        assert_eq!(object.len(), 2);

        let modern = &payload["FIX.4.4:EXEC->BANZAI"];
        assert_eq!(modern["connected"], json!(true));
        assert_eq!(modern["role"], json!("acceptor"));
        assert_eq!(modern["lastActivity"], json!("19700101-00:00:00.000"));
        assert_eq!(modern["properties"]["HeartBtInt"], json!("30"));
        assert_eq!(modern["properties"]["BeginString"], json!("FIX.4.4"));

        let legacy = &payload["FIX.4.2:EXEC->BANZAI"];
        assert_eq!(legacy["connected"], json!(false));
        assert_eq!(legacy["lastActivity"], Value::Null);
    }

    #[test]
    fn test_read_selector() {
        let (registry, endpoint, ids) = fixture();
        registry.initialize(ids.clone()).unwrap();

        let status = endpoint.read_selector("FIX.4.2:EXEC->BANZAI").unwrap();
        assert_eq!(status["connected"], json!(false));

        assert_eq!(
            endpoint.read_selector("FIX.4.0:EXEC->BANZAI"),
            Err(ActuatorError::NotFound("FIX.4.0:EXEC->BANZAI".to_string()))
        );
        assert!(matches!(
            endpoint.read_selector("not-a-key"),
            Err(ActuatorError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_every_listed_key_can_be_selected() {
        let doc = "\
[DEFAULT]
BeginString=FIX.4.4
SenderCompID=EXEC

[SESSION]
TargetCompID=DESK-1
TargetSubID=x.y
TargetLocationID=LDN

[SESSION]
TargetCompID=DESK-1
SenderLocationID=NY
SessionQualifier=backup:2
";
        let settings: SessionSettings = doc.parse().unwrap();
        let registry = Arc::new(SessionRegistry::new(SessionRole::Acceptor));
        registry.initialize(settings.session_ids().cloned()).unwrap();
        let table: Arc<dyn SessionTable> = registry.clone();
        let endpoint = SessionsEndpoint::new(SERVER_ENDPOINT_ID, table, Arc::new(settings));

        let listed = endpoint.list_sessions();
        assert_eq!(listed.len(), 2);
        for descriptor in listed {
            let key = descriptor.id.key();
            let status = endpoint.read_selector(&key).unwrap();
            assert_eq!(status["connected"], json!(false), "{key}");
        }
    }

    #[test]
    fn test_snapshot_is_not_live() {
        let (registry, endpoint, ids) = fixture();
        registry.initialize(ids.clone()).unwrap();
        let before = endpoint.describe_session(&ids[0]).unwrap();
        registry.on_connect(&ids[0]).unwrap();
        assert!(!before.connected);
        assert!(endpoint.describe_session(&ids[0]).unwrap().connected);
    }
}
