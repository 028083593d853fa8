//! Persisted session for the auth client

use crate::auth::Session;
use crate::error::{CoreError, CoreResult};
use crate::storage::KeyValueStore;
use std::rc::Rc;
use tracing::warn;

/// Reads and writes the serialized [`Session`] under a single key
#[derive(Clone)]
pub struct SessionStore {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    pub const DEFAULT_KEY: &'static str = "carenest.auth.session";

    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, Self::DEFAULT_KEY)
    }

    pub fn with_key(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Stored session, if any
    ///
    /// An unreadable entry is dropped and reported as no session.
    pub fn load(&self) -> CoreResult<Option<Session>> {
        let Some(raw) = self.get_raw()? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(%error, key = %self.key, "Discarding unreadable stored session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> CoreResult<()> {
        let serialized = serde_json::to_string(session)?;
        self.store
            .set(&self.key, &serialized)
            .map_err(|e| CoreError::browser_unavailable(e.to_string()))
    }

    pub fn clear(&self) -> CoreResult<()> {
        self.store
            .remove(&self.key)
            .map_err(|e| CoreError::browser_unavailable(e.to_string()))
    }

    fn get_raw(&self) -> CoreResult<Option<String>> {
        self.store
            .get(&self.key)
            .map_err(|e| CoreError::browser_unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::session_for;

    #[test]
    fn save_then_load() {
        let store = SessionStore::new(Rc::new(MemoryStore::new()));
        assert!(store.load().unwrap().is_none());

        let session = session_for("psych-3");
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_discarded() {
        let backing = Rc::new(MemoryStore::with_entries([(SessionStore::DEFAULT_KEY, "{not json")]));
        let store = SessionStore::new(backing.clone());

        assert!(store.load().unwrap().is_none());
        assert!(backing.get(SessionStore::DEFAULT_KEY).unwrap().is_none());
    }
}
