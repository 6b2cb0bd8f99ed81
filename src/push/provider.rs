//! Delivery of push messages to the push service.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::message::PushMessage;

pub const EXPO_PUSH_API_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Sends one batch of messages and returns the service's tickets, one per
/// message, as opaque JSON.
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<Value>>;
}

#[derive(Deserialize)]
struct PushResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// HTTP client for the Expo push API.
#[derive(Clone)]
pub struct ExpoPushClient {
    client: Client,
    api_url: String,
}

impl ExpoPushClient {
    /// # Arguments
    /// * `api_url` - Full URL of the send endpoint
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(api_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl PushProvider for ExpoPushClient {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<Value>> {
        debug!("Sending {} push message(s) to {}", messages.len(), self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(messages)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Push request failed with status: {}",
                response.status()
            ));
        }

        let body: PushResponse = response.json().await?;
        Ok(body.data)
    }
}
