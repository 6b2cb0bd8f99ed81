//! On-device key-value storage

mod file_store;
mod memory_store;
mod trait_def;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
pub use trait_def::{KeyValueStore, KvStoreError};
