use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{KeyValueStore, KvStoreError};

/// Volatile key-value store, used for tests and throwaway device sessions.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `KvStoreError::Unavailable`
    /// until turned off again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), KvStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(KvStoreError::Unavailable(
                "in-memory store set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        self.check_available()?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvStoreError> {
        self.check_available()?;
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvStoreError> {
        self.check_available()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1".to_string()).await.unwrap();
        store.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Removing twice is fine
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "v".to_string()).await.unwrap();

        store.set_failing(true);
        assert!(matches!(
            store.get("k").await,
            Err(KvStoreError::Unavailable(_))
        ));
        assert!(store.set("k", "x".to_string()).await.is_err());
        assert!(store.remove("k").await.is_err());

        store.set_failing(false);
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
