//! Composition root for the on-device services.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::deep_link::{
    AppRoute, DeepLinkDispatcher, DeepLinkSubscription, DispatchOutcome, Navigator,
    UrlEventSource,
};
use crate::kv_store::KeyValueStore;
use crate::notifications::{
    CallKind, LocalNotifier, NotificationAction, NotificationStore, ACTION_INCOMING_CALL,
    ACTION_NEW_MESSAGE,
};

use super::settings::{load_settings, save_settings, AppSettings};

pub const PUSH_TOKEN_KEY: &str = "expoPushToken";

/// Owns the notification store, the deep-link dispatcher, the saved settings
/// and the device push token. Built once at startup and shared by reference.
pub struct DeviceContext {
    kv: Arc<dyn KeyValueStore>,
    notifications: NotificationStore,
    deep_links: Arc<DeepLinkDispatcher>,
    navigator: Arc<dyn Navigator>,
    settings: Mutex<AppSettings>,
}

impl DeviceContext {
    /// Loads saved settings and wires the services together. The dispatcher
    /// comes with the built-in routes registered.
    pub async fn new(
        kv: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn LocalNotifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let settings = load_settings(kv.as_ref()).await;
        let notifications = NotificationStore::new(kv.clone(), notifier);
        notifications.set_options(settings.to_options());
        // Prime the unread count from whatever history is already stored.
        notifications.list_notifications().await;

        Self {
            kv,
            notifications,
            deep_links: Arc::new(DeepLinkDispatcher::with_default_routes(navigator.clone())),
            navigator,
            settings: Mutex::new(settings),
        }
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn deep_links(&self) -> &Arc<DeepLinkDispatcher> {
        &self.deep_links
    }

    /// Starts listening for URLs delivered by `source`.
    pub fn start(&self, source: Arc<dyn UrlEventSource>) -> DeepLinkSubscription {
        self.deep_links.initialize(source)
    }

    pub fn settings(&self) -> AppSettings {
        *self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Saves `settings` and applies them to new notifications right away.
    ///
    /// Nothing changes if the write fails.
    pub async fn update_settings(&self, settings: AppSettings) -> bool {
        if !save_settings(self.kv.as_ref(), &settings).await {
            return false;
        }
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = settings;
        self.notifications.set_options(settings.to_options());
        true
    }

    pub async fn save_push_token(&self, token: &str) -> bool {
        match self.kv.set(PUSH_TOKEN_KEY, token.to_string()).await {
            Ok(()) => {
                info!("Saved push token");
                true
            }
            Err(err) => {
                error!("Error saving push token: {}", err);
                false
            }
        }
    }

    pub async fn push_token(&self) -> Option<String> {
        match self.kv.get(PUSH_TOKEN_KEY).await {
            Ok(token) => token,
            Err(err) => {
                error!("Error reading push token: {}", err);
                None
            }
        }
    }

    /// Routes the user's response to notification `id` using its data
    /// payload.
    ///
    /// Decline dismisses the notification and opens nothing. Answer on a call
    /// dismisses it and opens the active call screen. Otherwise an explicit
    /// `deepLink` wins, incoming calls open the call screen and messages open
    /// the notifications list.
    pub fn handle_notification_response(
        &self,
        id: &str,
        action: NotificationAction,
        data: &BTreeMap<String, String>,
    ) -> DispatchOutcome {
        let payload_action = data.get("action").map(String::as_str);

        match action {
            NotificationAction::Decline => {
                info!("Declined notification {}", id);
                self.notifications.dismiss(id);
                return DispatchOutcome::Ignored;
            }
            NotificationAction::Answer if payload_action == Some(ACTION_INCOMING_CALL) => {
                self.notifications.dismiss(id);
                let Some((caller, kind)) = call_details(data) else {
                    debug!("Answered call notification without caller or type");
                    return DispatchOutcome::Ignored;
                };
                info!("Answered {} call from {}", kind, caller);
                self.navigator.navigate(AppRoute::ActiveCall { caller, kind });
                return DispatchOutcome::Default;
            }
            _ => {}
        }

        if let Some(url) = data.get("deepLink") {
            return self.deep_links.handle_deep_link(url);
        }

        match payload_action {
            Some(ACTION_INCOMING_CALL) => match call_details(data) {
                Some((caller, kind)) => {
                    self.navigator.navigate(AppRoute::IncomingCall { caller, kind });
                    DispatchOutcome::Default
                }
                None => {
                    debug!("Incoming call notification without caller or type");
                    DispatchOutcome::Ignored
                }
            },
            Some(ACTION_NEW_MESSAGE) => {
                self.navigator.navigate(AppRoute::Notifications);
                DispatchOutcome::Default
            }
            _ => DispatchOutcome::Ignored,
        }
    }
}

/// Caller and call type of a call payload. Local records carry the type as
/// `kind`, relayed pushes as `type`.
fn call_details(data: &BTreeMap<String, String>) -> Option<(String, CallKind)> {
    let caller = data.get("caller").filter(|c| !c.is_empty())?;
    let kind = data
        .get("kind")
        .or_else(|| data.get("type"))
        .and_then(|k| k.parse::<CallKind>().ok())?;
    Some((caller.clone(), kind))
}
