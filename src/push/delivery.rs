use serde_json::Value;
use tracing::error;

use super::message::{chunk_messages, PushMessage};
use super::provider::PushProvider;

/// Sends `messages` chunk by chunk and collects every ticket returned.
///
/// A failing chunk is logged and skipped; the remaining chunks are still sent.
pub async fn send_in_chunks(provider: &dyn PushProvider, messages: &[PushMessage]) -> Vec<Value> {
    let mut tickets = Vec::new();
    for chunk in chunk_messages(messages) {
        match provider.send(chunk).await {
            Ok(chunk_tickets) => tickets.extend(chunk_tickets),
            Err(err) => error!("Error sending notification chunk: {:#}", err),
        }
    }
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyProvider {
        calls: Mutex<Vec<usize>>,
        fail_call: Option<usize>,
    }

    #[async_trait]
    impl PushProvider for FlakyProvider {
        async fn send(&self, messages: &[PushMessage]) -> Result<Vec<Value>> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(messages.len());
                calls.len() - 1
            };
            if self.fail_call == Some(call) {
                bail!("boom");
            }
            Ok(messages
                .iter()
                .map(|m| json!({"status": "ok", "id": m.to}))
                .collect())
        }
    }

    fn messages(count: usize) -> Vec<PushMessage> {
        (0..count)
            .map(|i| PushMessage::new_message(&format!("ExpoPushToken[{}]", i), "s", "m"))
            .collect()
    }

    #[tokio::test]
    async fn test_collects_tickets_from_all_chunks() {
        let provider = FlakyProvider::default();
        let tickets = send_in_chunks(&provider, &messages(150)).await;

        assert_eq!(tickets.len(), 150);
        assert_eq!(*provider.calls.lock().unwrap(), vec![100, 50]);
    }

    #[tokio::test]
    async fn test_failing_chunk_is_skipped() {
        let provider = FlakyProvider {
            fail_call: Some(0),
            ..Default::default()
        };
        let tickets = send_in_chunks(&provider, &messages(150)).await;

        assert_eq!(tickets.len(), 50);
        assert_eq!(tickets[0]["id"], "ExpoPushToken[100]");
        assert_eq!(provider.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_to_send() {
        let provider = FlakyProvider::default();
        assert!(send_in_chunks(&provider, &[]).await.is_empty());
        assert!(provider.calls.lock().unwrap().is_empty());
    }
}
