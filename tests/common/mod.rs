//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, DEVICE_TOKEN_1};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_register() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.register_token(DEVICE_TOKEN_1).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod push_service;
mod server;

pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use push_service::FakePushService;
pub use server::TestServer;
