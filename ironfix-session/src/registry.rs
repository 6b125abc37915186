/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Live session table.
//!
//! The engine owns a [`SessionRegistry`] and updates it from its own threads
//! as counterparties connect and disconnect. Observers only see it through
//! the read-only [`SessionTable`] interface, and every read takes a single
//! lock acquisition so the returned snapshot is internally consistent.

use crate::descriptor::{SessionDescriptor, SessionRole};
use ironfix_core::error::SessionError;
use ironfix_core::{SessionId, Timestamp};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Read-only view over a live session table.
pub trait SessionTable: Send + Sync {
    /// Returns all sessions in registration order, or `None` when the engine
    /// has not been initialized yet.
    fn snapshot(&self) -> Option<Vec<SessionDescriptor>>;

    /// Returns one session, if present.
    fn lookup(&self, id: &SessionId) -> Option<SessionDescriptor> {
        self.snapshot()?.into_iter().find(|d| &d.id == id)
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    id: SessionId,
    connected: bool,
    last_activity: Option<Timestamp>,
}

#[derive(Debug, Default)]
struct Table {
    entries: Vec<SessionEntry>,
    index: HashMap<SessionId, usize>,
}

impl Table {
    fn insert(&mut self, id: SessionId) -> Result<(), SessionError> {
        if self.index.contains_key(&id) {
            return Err(SessionError::DuplicateSession(id.to_string()));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(SessionEntry {
            id,
            connected: false,
            last_activity: None,
        });
        Ok(())
    }

    fn entry_mut(&mut self, id: &SessionId) -> Result<&mut SessionEntry, SessionError> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))?;
        Ok(&mut self.entries[idx])
    }
}

/// In-memory session table for one engine role.
#[derive(Debug)]
pub struct SessionRegistry {
    role: SessionRole,
    table: RwLock<Option<Table>>,
}

impl SessionRegistry {
    /// Creates an uninitialized registry.
    #[must_use]
    pub fn new(role: SessionRole) -> Self {
        Self {
            role,
            table: RwLock::new(None),
        }
    }

    /// Returns the engine role.
    #[must_use]
    pub const fn role(&self) -> SessionRole {
        self.role
    }

    /// Initializes the table with the given sessions, replacing any previous
    /// content.
    ///
    /// # Errors
    /// Returns `SessionError::DuplicateSession` if an id appears twice; the
    /// registry is left untouched in that case.
    pub fn initialize(&self, ids: impl IntoIterator<Item = SessionId>) -> Result<(), SessionError> {
        let mut table = Table::default();
        for id in ids {
            table.insert(id)?;
        }
        info!(role = %self.role, sessions = table.entries.len(), "session registry initialized");
        *self.table.write() = Some(table);
        Ok(())
    }

    /// Returns true once [`initialize`](Self::initialize) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.table.read().is_some()
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().as_ref().map_or(0, |t| t.entries.len())
    }

    /// Returns true if no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a session to an initialized table.
    ///
    /// # Errors
    /// Returns `SessionError::NotInitialized` or `SessionError::DuplicateSession`.
    pub fn register(&self, id: SessionId) -> Result<(), SessionError> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or(SessionError::NotInitialized)?;
        debug!(session = %id, "registering session");
        table.insert(id)
    }

    /// Marks a session as connected.
    ///
    /// # Errors
    /// Returns `SessionError::NotInitialized` or `SessionError::UnknownSession`.
    pub fn on_connect(&self, id: &SessionId) -> Result<(), SessionError> {
        self.update(id, |entry| {
            entry.connected = true;
            entry.last_activity = Some(Timestamp::now());
        })?;
        info!(session = %id, "session connected");
        Ok(())
    }

    /// Marks a session as disconnected.
    ///
    /// # Errors
    /// Returns `SessionError::NotInitialized` or `SessionError::UnknownSession`.
    pub fn on_disconnect(&self, id: &SessionId) -> Result<(), SessionError> {
        self.update(id, |entry| entry.connected = false)?;
        info!(session = %id, "session disconnected");
        Ok(())
    }

    /// Records activity on a session at the given time.
    ///
    /// # Errors
    /// Returns `SessionError::NotInitialized` or `SessionError::UnknownSession`.
    pub fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), SessionError> {
        self.update(id, |entry| entry.last_activity = Some(at))
    }

    /// Drops the table; the registry reads as not initialized afterwards.
    pub fn clear(&self) {
        if self.table.write().take().is_some() {
            info!(role = %self.role, "session registry cleared");
        }
    }

    fn update(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut SessionEntry),
    ) -> Result<(), SessionError> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or(SessionError::NotInitialized)?;
        f(table.entry_mut(id)?);
        Ok(())
    }

    fn describe(&self, entry: &SessionEntry) -> SessionDescriptor {
        SessionDescriptor {
            id: entry.id.clone(),
            role: self.role,
            connected: entry.connected,
            last_activity: entry.last_activity,
        }
    }
}

impl SessionTable for SessionRegistry {
    fn snapshot(&self) -> Option<Vec<SessionDescriptor>> {
        let guard = self.table.read();
        let table = guard.as_ref()?;
        Some(table.entries.iter().map(|e| self.describe(e)).collect())
    }

    fn lookup(&self, id: &SessionId) -> Option<SessionDescriptor> {
        let guard = self.table.read();
        let table = guard.as_ref()?;
        let idx = *table.index.get(id)?;
        Some(self.describe(&table.entries[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfix_core::CompId;
    use std::sync::Arc;
    use std::thread;

    fn id(target: &str) -> SessionId {
        SessionId::new(
            "FIX.4.4",
            CompId::new("EXEC").unwrap(),
            CompId::new(target).unwrap(),
        )
    }

    #[test]
    fn test_uninitialized_registry() {
        let registry = SessionRegistry::new(SessionRole::Acceptor);
        assert!(!registry.is_initialized());
        assert!(registry.snapshot().is_none());
        assert!(registry.lookup(&id("A")).is_none());
        assert_eq!(registry.on_connect(&id("A")), Err(SessionError::NotInitialized));
        assert_eq!(registry.register(id("A")), Err(SessionError::NotInitialized));
    }

    #[test]
    fn test_initialize_keeps_registration_order() {
        let registry = SessionRegistry::new(SessionRole::Acceptor);
        registry.initialize([id("C"), id("A"), id("B")]).unwrap();
        registry.register(id("D")).unwrap();

        let targets: Vec<String> = registry
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|d| d.id.target_comp_id.to_string())
            .collect();
        assert_eq!(targets, vec!["C", "A", "B", "D"]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_initialize_rejects_duplicates() {
        let registry = SessionRegistry::new(SessionRole::Initiator);
        let err = registry.initialize([id("A"), id("A")]).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateSession(_)));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_initialized_empty_registry() {
        let registry = SessionRegistry::new(SessionRole::Acceptor);
        registry.initialize(Vec::new()).unwrap();
        assert_eq!(registry.snapshot(), Some(Vec::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_connect_disconnect_and_touch() {
        let registry = SessionRegistry::new(SessionRole::Acceptor);
        registry.initialize([id("A")]).unwrap();

        let before = registry.lookup(&id("A")).unwrap();
        assert!(!before.connected);
        assert!(before.last_activity.is_none());
        assert_eq!(before.role, SessionRole::Acceptor);

        registry.on_connect(&id("A")).unwrap();
        assert!(registry.lookup(&id("A")).unwrap().connected);

        registry.touch(&id("A"), Timestamp::from_millis(42)).unwrap();
        registry.on_disconnect(&id("A")).unwrap();
        let after = registry.lookup(&id("A")).unwrap();
        assert!(!after.connected);
        assert_eq!(after.last_activity, Some(Timestamp::from_millis(42)));

        // The earlier snapshot is unaffected.
        assert!(!before.connected);

        assert_eq!(
            registry.on_connect(&id("Z")),
            Err(SessionError::UnknownSession("FIX.4.4:EXEC->Z".to_string()))
        );
    }

    #[test]
    fn test_clear() {
        let registry = SessionRegistry::new(SessionRole::Acceptor);
        registry.initialize([id("A")]).unwrap();
        registry.clear();
        assert!(registry.snapshot().is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let registry = Arc::new(SessionRegistry::new(SessionRole::Acceptor));
        let ids: Vec<SessionId> = (0..16).map(|i| id(&format!("T{i}"))).collect();
        registry.initialize(ids.clone()).unwrap();

        let writer = {
            let registry = Arc::clone(&registry);
            let ids = ids.clone();
            thread::spawn(move || {
                for round in 0..200 {
                    for sid in &ids {
                        if round % 2 == 0 {
                            registry.on_connect(sid).unwrap();
                        } else {
                            registry.on_disconnect(sid).unwrap();
                        }
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = registry.snapshot().unwrap();
                        assert_eq!(snapshot.len(), 16);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(registry.snapshot().unwrap().iter().all(|d| !d.connected));
    }
}
