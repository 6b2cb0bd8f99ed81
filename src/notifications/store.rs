//! Notification history and badge synchronization.
//!
//! The history lives in the key-value store under [`NOTIFICATIONS_KEY`] as a
//! JSON array, newest first, capped at [`MAX_STORED_NOTIFICATIONS`]. Every
//! successful write recomputes the unread count from the sequence just
//! written and queues a badge update.
//!
//! A history that is not a JSON array reads as empty; individual entries
//! that fail to parse are skipped.
//!
//! Storage errors never escape this module: they are logged and the
//! operation degrades to a no-op (writes) or an empty result (reads).
//! Platform side effects (scheduling, badge, cancellation) run on a
//! background worker in submission order; their failures are only logged.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::kv_store::{KeyValueStore, KvStoreError};

use super::local_notifier::{
    LocalNotification, LocalNotifier, NotificationChannel, CALL_ACTIONS_CATEGORY,
};
use super::models::{CallKind, NotificationRecord};

pub const NOTIFICATIONS_KEY: &str = "notifications";
pub const MAX_STORED_NOTIFICATIONS: usize = 50;

/// Presentation preferences applied to newly created notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationOptions {
    /// When false, notifications are recorded but not presented.
    pub enabled: bool,
    pub sound: bool,
    pub vibration: bool,
    pub heads_up: bool,
    /// When false, the badge is kept at zero regardless of unread count.
    pub badge: bool,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            vibration: true,
            heads_up: true,
            badge: true,
        }
    }
}

enum SideEffect {
    Schedule(LocalNotification),
    SetBadge(usize),
    CancelAllScheduled,
    Dismiss(String),
    Flush(oneshot::Sender<()>),
}

pub struct NotificationStore {
    kv: Arc<dyn KeyValueStore>,
    unread: AtomicUsize,
    last_issued_millis: AtomicI64,
    options: Mutex<NotificationOptions>,
    side_effects: mpsc::UnboundedSender<SideEffect>,
}

impl NotificationStore {
    /// Creates the store and spawns its side-effect worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(kv: Arc<dyn KeyValueStore>, notifier: Arc<dyn LocalNotifier>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_side_effects(notifier, rx));
        Self {
            kv,
            unread: AtomicUsize::new(0),
            last_issued_millis: AtomicI64::new(0),
            options: Mutex::new(NotificationOptions::default()),
            side_effects: tx,
        }
    }

    pub fn options(&self) -> NotificationOptions {
        *self.options.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_options(&self, options: NotificationOptions) {
        *self.options.lock().unwrap_or_else(|e| e.into_inner()) = options;
    }

    /// Records an incoming call notification and presents it.
    ///
    /// Returns the new notification id, or `None` if it could not be stored.
    pub async fn create_call_notification(&self, caller: &str, kind: CallKind) -> Option<String> {
        let record = NotificationRecord::incoming_call(caller, kind, self.next_timestamp());
        let id = record.id.clone();
        let local = self.local_notification(
            &record,
            NotificationChannel::Calls,
            Some(CALL_ACTIONS_CATEGORY.to_string()),
        );

        if !self.store_notification(record).await {
            error!("Error scheduling call notification from {}", caller);
            return None;
        }
        self.present(local);
        Some(id)
    }

    /// Records a new message notification and presents it.
    ///
    /// Returns the new notification id, or `None` if it could not be stored.
    pub async fn create_message_notification(&self, sender: &str, message: &str) -> Option<String> {
        let record = NotificationRecord::new_message(sender, message, self.next_timestamp());
        let id = record.id.clone();
        let local = self.local_notification(&record, NotificationChannel::Messages, None);

        if !self.store_notification(record).await {
            error!("Error scheduling message notification from {}", sender);
            return None;
        }
        self.present(local);
        Some(id)
    }

    /// Prepends `record` to the history, truncating to the most recent
    /// [`MAX_STORED_NOTIFICATIONS`]. A stored record with the same id is
    /// replaced. Returns whether the write succeeded.
    pub async fn store_notification(&self, record: NotificationRecord) -> bool {
        match self.try_store(record).await {
            Ok(()) => true,
            Err(err) => {
                error!("Error storing notification: {}", err);
                false
            }
        }
    }

    async fn try_store(&self, record: NotificationRecord) -> Result<(), KvStoreError> {
        let mut records = self.load().await?;
        records.retain(|r| r.id != record.id);
        records.insert(0, record);
        records.truncate(MAX_STORED_NOTIFICATIONS);
        self.persist(&records).await
    }

    /// Marks the notification with `id` as read. Unknown ids are ignored.
    pub async fn mark_as_read(&self, id: &str) {
        let result: Result<(), KvStoreError> = async {
            let mut records = self.load().await?;
            if records.is_empty() {
                return Ok(());
            }
            for record in records.iter_mut().filter(|r| r.id == id) {
                record.read = true;
            }
            self.persist(&records).await
        }
        .await;

        if let Err(err) = result {
            error!("Error marking notification {} as read: {}", id, err);
        }
    }

    /// Marks every stored notification as read.
    pub async fn mark_all_as_read(&self) {
        let result: Result<(), KvStoreError> = async {
            let mut records = self.load().await?;
            if records.is_empty() {
                return Ok(());
            }
            records.iter_mut().for_each(|r| r.read = true);
            self.persist(&records).await
        }
        .await;

        if let Err(err) = result {
            error!("Error marking all notifications as read: {}", err);
        }
    }

    /// Drops the whole history, zeroes the badge and cancels pending
    /// local notifications.
    pub async fn clear_all(&self) {
        if let Err(err) = self.kv.remove(NOTIFICATIONS_KEY).await {
            error!("Error clearing notifications: {}", err);
            return;
        }
        self.unread.store(0, Ordering::SeqCst);
        self.submit(SideEffect::SetBadge(0));
        self.submit(SideEffect::CancelAllScheduled);
    }

    /// Removes the presented notification `id` from the tray. The history
    /// record is kept.
    pub fn dismiss(&self, id: &str) {
        self.submit(SideEffect::Dismiss(id.to_string()));
    }

    /// Current history, newest first. Empty on missing or unreadable data.
    pub async fn list_notifications(&self) -> Vec<NotificationRecord> {
        match self.load().await {
            Ok(records) => {
                self.unread.store(count_unread(&records), Ordering::SeqCst);
                records
            }
            Err(err) => {
                error!("Error loading notifications: {}", err);
                Vec::new()
            }
        }
    }

    /// Unread count of the most recently loaded or stored history.
    pub fn unread_count(&self) -> usize {
        self.unread.load(Ordering::SeqCst)
    }

    /// Waits until every side effect submitted so far has run.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        self.submit(SideEffect::Flush(tx));
        let _ = rx.await;
    }

    async fn load(&self) -> Result<Vec<NotificationRecord>, KvStoreError> {
        let Some(raw) = self.kv.get(NOTIFICATIONS_KEY).await? else {
            return Ok(Vec::new());
        };
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Discarding unreadable notification history: {}", err);
                return Ok(Vec::new());
            }
        };
        // Unreadable entries are dropped one by one so the rest survive.
        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping unreadable notification record: {}", err);
                    None
                }
            })
            .collect())
    }

    async fn persist(&self, records: &[NotificationRecord]) -> Result<(), KvStoreError> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(NOTIFICATIONS_KEY, raw).await?;

        let unread = count_unread(records);
        self.unread.store(unread, Ordering::SeqCst);
        let badge = if self.options().badge { unread } else { 0 };
        self.submit(SideEffect::SetBadge(badge));
        Ok(())
    }

    fn present(&self, notification: LocalNotification) {
        if !self.options().enabled {
            debug!("Notifications disabled, not presenting '{}'", notification.title);
            return;
        }
        self.submit(SideEffect::Schedule(notification));
    }

    fn local_notification(
        &self,
        record: &NotificationRecord,
        channel: NotificationChannel,
        category: Option<String>,
    ) -> LocalNotification {
        let options = self.options();
        LocalNotification {
            id: record.id.clone(),
            title: record.title.clone(),
            body: record.body.clone(),
            payload: record.payload.clone(),
            channel,
            category,
            sound_enabled: options.sound,
            heads_up: options.heads_up,
            vibration_pattern: if options.vibration {
                channel.vibration_pattern().to_vec()
            } else {
                Vec::new()
            },
        }
    }

    fn submit(&self, effect: SideEffect) {
        if self.side_effects.send(effect).is_err() {
            debug!("Side-effect worker is gone, dropping effect");
        }
    }

    /// Returns a creation instant never equal to a previously issued one at
    /// millisecond precision, so generated ids stay unique.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_issued_millis.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_issued_millis.compare_exchange(
                last,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return DateTime::from_timestamp_millis(next).unwrap_or_else(Utc::now),
                Err(current) => last = current,
            }
        }
    }
}

fn count_unread(records: &[NotificationRecord]) -> usize {
    records.iter().filter(|r| !r.read).count()
}

async fn run_side_effects(
    notifier: Arc<dyn LocalNotifier>,
    mut rx: mpsc::UnboundedReceiver<SideEffect>,
) {
    while let Some(effect) = rx.recv().await {
        let result = match effect {
            SideEffect::Schedule(notification) => notifier.schedule(notification).await,
            SideEffect::SetBadge(count) => notifier.set_badge_count(count).await,
            SideEffect::CancelAllScheduled => notifier.cancel_all_scheduled().await,
            SideEffect::Dismiss(id) => notifier.dismiss(&id).await,
            SideEffect::Flush(done) => {
                let _ = done.send(());
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!("Local notification side effect failed: {}", err);
        }
    }
}
