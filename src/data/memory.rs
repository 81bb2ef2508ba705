use crate::domain::repository::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// Process-local store; contents are lost on restart.
#[derive(Clone)]
pub struct InMemoryKeyValueStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    #[instrument(skip(self))]
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        trace!("Acquiring read lock for memory storage");
        let storage = self.storage.read().await;
        Ok(storage.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        trace!("Acquiring write lock for memory storage");
        let mut storage = self.storage.write().await;
        storage.insert(key.to_string(), value);
        debug!(key = key, "Item saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut storage = self.storage.write().await;
        if storage.remove(key).is_some() {
            debug!(key = key, "Item removed from memory storage");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_item_returns_none_for_missing_key() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.get_item("tasks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_item_overwrites_existing_value() {
        let store = InMemoryKeyValueStore::new();
        store.set_item("goals", "[]".to_string()).await.unwrap();
        store
            .set_item("goals", r#"[{"id":"1"}]"#.to_string())
            .await
            .unwrap();

        let value = store.get_item("goals").await.unwrap().unwrap();
        assert_eq!(value, r#"[{"id":"1"}]"#);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let store = InMemoryKeyValueStore::new();
        store.set_item("sessions", "[]".to_string()).await.unwrap();
        store.remove_item("sessions").await.unwrap();
        assert!(store.get_item("sessions").await.unwrap().is_none());

        // Removing a missing key is not an error
        store.remove_item("sessions").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = InMemoryKeyValueStore::new();
        let clone = store.clone();
        clone.set_item("users", "[]".to_string()).await.unwrap();
        assert!(store.get_item("users").await.unwrap().is_some());
    }
}
