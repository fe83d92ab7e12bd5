//! In-memory session store.

use super::{SessionStore, StoreError};
use crate::session::Session;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

/// Process-local [`SessionStore`] keyed by session id.
///
/// Sessions are cloned out, so callers only ever see consistent
/// snapshots. Saves enforce the optimistic version check under a single
/// map lock, making each write all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(session.id()) {
            warn!("Session id already exists");
            return Err(StoreError::Conflict);
        }
        sessions.insert(session.id().clone(), session.clone());
        debug!("Session created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.lock().unwrap();
        let session = sessions.get(session_id).cloned();
        if session.is_none() {
            debug!(session_id, "Session not found");
        }
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(session.id()) {
            Some(stored) if *session.version() == stored.version() + 1 => {
                sessions.insert(session.id().clone(), session.clone());
                debug!(version = session.version(), "Session saved");
                Ok(())
            }
            Some(stored) => {
                warn!(
                    stored_version = stored.version(),
                    incoming_version = session.version(),
                    "Save rejected, version moved on"
                );
                Err(StoreError::Conflict)
            }
            None => {
                warn!("Save rejected, session was never created");
                Err(StoreError::Conflict)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("s1".to_owned(), "p1".to_owned())
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = MemoryStore::new();
        let session = session();
        store.create(&session).await.expect("create");
        let loaded = store.load("s1").await.expect("load");
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_load_unknown_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load("missing").await.expect("load"), None);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = MemoryStore::new();
        store.create(&session()).await.expect("create");
        assert_eq!(
            store.create(&session()).await,
            Err(StoreError::Conflict)
        );
    }

    #[tokio::test]
    async fn test_save_requires_next_version() {
        let store = MemoryStore::new();
        store.create(&session()).await.expect("create");

        let mut first = store.load("s1").await.expect("load").expect("present");
        first.bump_version();
        store.save(&first).await.expect("save with next version");

        // A second writer holding the original snapshot loses the race.
        let mut stale = session();
        stale.bump_version();
        assert_eq!(store.save(&stale).await, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_save_without_create_conflicts() {
        let store = MemoryStore::new();
        assert_eq!(store.save(&session()).await, Err(StoreError::Conflict));
    }
}
