//! Notification data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Payload `action` value for call notifications.
pub const ACTION_INCOMING_CALL: &str = "incoming_call";

/// Payload `action` value for message notifications.
pub const ACTION_NEW_MESSAGE: &str = "new_message";

/// Notification kind, persisted under the `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Voice,
    Video,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two kinds of call the app can place or receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Voice,
    Video,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(Self::Voice),
            "video" => Ok(Self::Video),
            _ => Err(format!("Unknown call kind: {}", s)),
        }
    }
}

impl From<CallKind> for NotificationKind {
    fn from(kind: CallKind) -> Self {
        match kind {
            CallKind::Voice => NotificationKind::Voice,
            CallKind::Video => NotificationKind::Video,
        }
    }
}

/// A notification as kept in the device's notification history.
///
/// Field names on disk (`type`, `timestamp`, `data`) match the blob written
/// by earlier app versions so existing histories keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "data", default)]
    pub payload: BTreeMap<String, String>,
}

impl NotificationRecord {
    /// Builds an unread record whose id is `<kind>-<created_at millis>`.
    pub fn new(
        kind: NotificationKind,
        title: String,
        body: String,
        created_at: DateTime<Utc>,
        payload: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: format!("{}-{}", kind, created_at.timestamp_millis()),
            title,
            body,
            kind,
            created_at,
            read: false,
            payload,
        }
    }

    pub fn incoming_call(caller: &str, kind: CallKind, created_at: DateTime<Utc>) -> Self {
        let payload = BTreeMap::from([
            ("caller".to_string(), caller.to_string()),
            ("kind".to_string(), kind.to_string()),
            ("action".to_string(), ACTION_INCOMING_CALL.to_string()),
        ]);
        Self::new(
            kind.into(),
            format!("Incoming {} call", kind),
            format!("{} is calling you", caller),
            created_at,
            payload,
        )
    }

    pub fn new_message(sender: &str, message: &str, created_at: DateTime<Utc>) -> Self {
        let payload = BTreeMap::from([
            ("sender".to_string(), sender.to_string()),
            ("message".to_string(), message.to_string()),
            ("action".to_string(), ACTION_NEW_MESSAGE.to_string()),
        ]);
        Self::new(
            NotificationKind::Message,
            sender.to_string(),
            message.to_string(),
            created_at,
            payload,
        )
    }
}
