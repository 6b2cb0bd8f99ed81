//! User-facing app settings persisted on the device.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::kv_store::KeyValueStore;
use crate::notifications::NotificationOptions;

pub const SETTINGS_KEY: &str = "appSettings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub notifications: bool,
    pub sound: bool,
    pub vibration: bool,
    pub heads_up: bool,
    pub badge_count: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            vibration: true,
            heads_up: true,
            badge_count: true,
        }
    }
}

impl AppSettings {
    pub fn to_options(&self) -> NotificationOptions {
        NotificationOptions {
            enabled: self.notifications,
            sound: self.sound,
            vibration: self.vibration,
            heads_up: self.heads_up,
            badge: self.badge_count,
        }
    }
}

/// Reads the saved settings. Missing, unreadable or corrupt values all fall
/// back to defaults.
pub async fn load_settings(kv: &dyn KeyValueStore) -> AppSettings {
    let raw = match kv.get(SETTINGS_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return AppSettings::default(),
        Err(err) => {
            error!("Error loading settings: {}", err);
            return AppSettings::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("Discarding corrupt settings: {}", err);
            AppSettings::default()
        }
    }
}

/// Persists `settings`. Returns whether the write succeeded.
pub async fn save_settings(kv: &dyn KeyValueStore, settings: &AppSettings) -> bool {
    let result = match serde_json::to_string(settings) {
        Ok(json) => kv.set(SETTINGS_KEY, json).await,
        Err(err) => Err(err.into()),
    };
    if let Err(err) = result {
        error!("Error saving settings: {}", err);
        return false;
    }
    true
}
