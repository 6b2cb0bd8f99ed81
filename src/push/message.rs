//! Push messages in the Expo wire format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::notifications::{
    NotificationChannel, ACTION_INCOMING_CALL, ACTION_NEW_MESSAGE, CALL_ACTIONS_CATEGORY,
};

/// Most messages the push service accepts in a single request.
pub const MAX_MESSAGES_PER_CHUNK: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl PushMessage {
    /// High priority call alert carrying a deep link to the incoming call
    /// screen. `kind` is forwarded verbatim.
    pub fn incoming_call(to: &str, caller: &str, kind: &str) -> Self {
        let deep_link = format!(
            "myapp://call/incoming?caller={}&type={}",
            urlencoding::encode(caller),
            kind
        );
        Self {
            to: to.to_string(),
            sound: Some("default".to_string()),
            title: format!("Incoming {} call", kind),
            body: format!("{} is calling you", caller),
            data: BTreeMap::from([
                ("caller".to_string(), caller.to_string()),
                ("type".to_string(), kind.to_string()),
                ("action".to_string(), ACTION_INCOMING_CALL.to_string()),
                ("deepLink".to_string(), deep_link),
            ]),
            category_id: Some(CALL_ACTIONS_CATEGORY.to_string()),
            priority: Some("high".to_string()),
            channel_id: Some(NotificationChannel::Calls.id().to_string()),
        }
    }

    pub fn new_message(to: &str, sender: &str, message: &str) -> Self {
        Self {
            to: to.to_string(),
            sound: Some("default".to_string()),
            title: sender.to_string(),
            body: message.to_string(),
            data: BTreeMap::from([
                ("sender".to_string(), sender.to_string()),
                ("message".to_string(), message.to_string()),
                ("action".to_string(), ACTION_NEW_MESSAGE.to_string()),
                ("deepLink".to_string(), "myapp://notifications".to_string()),
            ]),
            category_id: None,
            priority: None,
            channel_id: Some(NotificationChannel::Messages.id().to_string()),
        }
    }
}

/// Splits `messages` into request-sized batches, preserving order.
pub fn chunk_messages(messages: &[PushMessage]) -> Vec<&[PushMessage]> {
    messages.chunks(MAX_MESSAGES_PER_CHUNK).collect()
}
