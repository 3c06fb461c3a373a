//! Conversation persistence.
//!
//! Mirrors the in-memory history into a [`KeyValueStore`] and keeps the
//! "welcome already shown" flag. Storage problems are logged and swallowed:
//! a broken store must never take the chat down.

use crate::ports::key_value_store::KeyValueStore;
use balikci_domain::Conversation;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the serialized message history.
pub const HISTORY_KEY: &str = "chatMessages";

/// Key set to `"true"` once the welcome banner was acknowledged.
pub const WELCOME_KEY: &str = "hasSeenWelcome";

/// Persistence facade over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted history.
    ///
    /// A missing key, an unreadable store, or a history that does not parse
    /// all yield an empty conversation.
    pub fn load(&self) -> Conversation {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Conversation::new(),
            Err(e) => {
                warn!("Could not read saved messages: {}", e);
                return Conversation::new();
            }
        };

        match Conversation::from_json(&raw) {
            Ok(conversation) => {
                debug!("Loaded {} saved messages", conversation.len());
                conversation
            }
            Err(e) => {
                warn!("Failed to parse saved messages: {}", e);
                Conversation::new()
            }
        }
    }

    /// Persist the history. Empty histories are not written.
    pub fn save(&self, conversation: &Conversation) {
        if conversation.is_empty() {
            return;
        }
        if let Err(e) = self.store.set(HISTORY_KEY, &conversation.to_json()) {
            warn!("Could not save messages: {}", e);
        }
    }

    /// Drop the persisted history.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Could not remove saved messages: {}", e);
        }
    }

    pub fn has_seen_welcome(&self) -> bool {
        matches!(self.store.get(WELCOME_KEY), Ok(Some(v)) if v == "true")
    }

    pub fn mark_welcome_seen(&self) {
        if let Err(e) = self.store.set(WELCOME_KEY, "true") {
            warn!("Could not store welcome flag: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::key_value_store::StoreError;
    use balikci_domain::Message;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store for application tests.
    #[derive(Default)]
    pub(crate) struct MapStore {
        pub(crate) values: Mutex<HashMap<String, String>>,
    }

    impl MapStore {
        pub(crate) fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub(crate) fn value(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }
    }

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.value(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn load_missing_history_is_empty() {
        let store = ConversationStore::new(Arc::new(MapStore::default()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_history_loads_as_empty() {
        for raw in ["not json at all", "{\"role\":\"user\"}", "[{\"content\":1}]", ""] {
            let store = ConversationStore::new(Arc::new(MapStore::with(HISTORY_KEY, raw)));
            assert!(store.load().is_empty(), "expected empty for {raw:?}");
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let backing = Arc::new(MapStore::default());
        let store = ConversationStore::new(backing.clone());

        let mut conversation = Conversation::new();
        conversation.push(Message::user("Pass by value vs pass by reference?"));
        conversation.push(Message::assistant("One copies, one aliases."));
        store.save(&conversation);

        assert!(backing.value(HISTORY_KEY).is_some());
        assert_eq!(store.load(), conversation);
    }

    #[test]
    fn empty_conversation_is_not_written() {
        let backing = Arc::new(MapStore::default());
        let store = ConversationStore::new(backing.clone());
        store.save(&Conversation::new());
        assert!(backing.value(HISTORY_KEY).is_none());
    }

    #[test]
    fn clear_removes_history_only() {
        let backing = Arc::new(MapStore::with(HISTORY_KEY, "[]"));
        let store = ConversationStore::new(backing.clone());
        store.mark_welcome_seen();
        store.clear();
        assert!(backing.value(HISTORY_KEY).is_none());
        assert!(store.has_seen_welcome());
    }

    #[test]
    fn welcome_flag_defaults_to_unseen() {
        let store = ConversationStore::new(Arc::new(MapStore::default()));
        assert!(!store.has_seen_welcome());
        store.mark_welcome_seen();
        assert!(store.has_seen_welcome());
    }

    #[test]
    fn broken_store_never_panics() {
        let store = ConversationStore::new(Arc::new(BrokenStore));
        assert!(store.load().is_empty());
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        store.save(&conversation);
        store.clear();
        store.mark_welcome_seen();
        assert!(!store.has_seen_welcome());
    }
}
