//! Local (on-device) notification presentation.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Category carrying the Answer/Decline actions on call notifications.
pub const CALL_ACTIONS_CATEGORY: &str = "call-actions";

/// What the user did with a presented notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationAction {
    /// Tapped the notification body.
    #[default]
    Default,
    /// Pressed the call category's Answer button.
    Answer,
    /// Pressed the call category's Decline button.
    Decline,
}

impl NotificationAction {
    /// Action identifier as registered with the platform.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Answer => "answer",
            Self::Decline => "decline",
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for NotificationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "answer" => Ok(Self::Answer),
            "decline" => Ok(Self::Decline),
            _ => Err(format!("Unknown notification action: {}", s)),
        }
    }
}

/// Android-style notification channels the app posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Calls,
    Messages,
}

impl NotificationChannel {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Calls => "call-notifications",
            Self::Messages => "message-notifications",
        }
    }

    /// Vibration pattern in milliseconds (wait, vibrate, wait, ...).
    pub fn vibration_pattern(&self) -> &'static [u64] {
        match self {
            Self::Calls => &[0, 250, 250, 250],
            Self::Messages => &[0, 250],
        }
    }
}

/// A notification to be presented by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalNotification {
    /// Id of the history record, used to dismiss the notification later.
    pub id: String,
    pub title: String,
    pub body: String,
    pub payload: BTreeMap<String, String>,
    pub channel: NotificationChannel,
    pub category: Option<String>,
    pub sound_enabled: bool,
    /// Present as a heads-up banner rather than silently in the tray.
    pub heads_up: bool,
    /// Empty when vibration is disabled.
    pub vibration_pattern: Vec<u64>,
}

/// Platform notification scheduler and badge controller.
///
/// All calls are fire-and-forget from the caller's perspective: errors are
/// logged by the caller and never surfaced further.
#[async_trait]
pub trait LocalNotifier: Send + Sync {
    async fn schedule(&self, notification: LocalNotification) -> Result<()>;

    async fn set_badge_count(&self, count: usize) -> Result<()>;

    async fn cancel_all_scheduled(&self) -> Result<()>;

    /// Removes the presented notification with `id` from the tray.
    async fn dismiss(&self, id: &str) -> Result<()>;
}

/// Notifier for hosts with no notification surface; logs what it would show.
pub struct LoggingLocalNotifier;

#[async_trait]
impl LocalNotifier for LoggingLocalNotifier {
    async fn schedule(&self, notification: LocalNotification) -> Result<()> {
        info!(
            "[{}] {}: {} (sound: {}, heads-up: {}, vibration: {:?})",
            notification.channel.id(),
            notification.title,
            notification.body,
            notification.sound_enabled,
            notification.heads_up,
            notification.vibration_pattern
        );
        Ok(())
    }

    async fn set_badge_count(&self, count: usize) -> Result<()> {
        info!("Badge count: {}", count);
        Ok(())
    }

    async fn cancel_all_scheduled(&self) -> Result<()> {
        info!("Cancelled all scheduled notifications");
        Ok(())
    }

    async fn dismiss(&self, id: &str) -> Result<()> {
        info!("Dismissed notification {}", id);
        Ok(())
    }
}
