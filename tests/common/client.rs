//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per relay endpoint. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn register_token(&self, token: &str) -> Response {
        self.post_json("/api/register-token", json!({ "token": token }))
            .await
    }

    pub async fn send_call(&self, body: Value) -> Response {
        self.post_json("/api/send-call-notification", body).await
    }

    pub async fn send_message(&self, body: Value) -> Response {
        self.post_json("/api/send-message-notification", body)
            .await
    }

    pub async fn get_tokens(&self) -> Response {
        self.get("/api/tokens").await
    }

    pub async fn get_status(&self) -> Response {
        self.get("/api/test").await
    }
}
