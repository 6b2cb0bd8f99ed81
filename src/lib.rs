//! Callbell Library
//!
//! Client-side core of the call/notification demo (notification bookkeeping,
//! deep-link routing, on-device key-value storage) and the push relay server.

pub mod config;
pub mod deep_link;
pub mod device;
pub mod kv_store;
pub mod notifications;
pub mod push;
pub mod server;

// Re-export commonly used types for convenience
pub use deep_link::{AppRoute, DeepLinkDispatcher, Navigator};
pub use device::DeviceContext;
pub use kv_store::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use notifications::{NotificationKind, NotificationRecord, NotificationStore};
pub use server::{run_server, RequestsLoggingLevel};
