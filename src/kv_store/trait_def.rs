//! Key-value store trait definition

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by key-value store implementations.
#[derive(Debug, Error)]
pub enum KvStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Async string-keyed storage with opaque string values.
///
/// Values are JSON documents owned by the caller; the store never looks
/// inside them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), KvStoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), KvStoreError>;
}
