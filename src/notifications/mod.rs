//! Device notification history module

mod local_notifier;
mod models;
mod store;

pub use local_notifier::{
    LocalNotification, LocalNotifier, LoggingLocalNotifier, NotificationAction,
    NotificationChannel, CALL_ACTIONS_CATEGORY,
};
pub use models::{
    CallKind, NotificationKind, NotificationRecord, ACTION_INCOMING_CALL, ACTION_NEW_MESSAGE,
};
pub use store::{
    NotificationOptions, NotificationStore, MAX_STORED_NOTIFICATIONS, NOTIFICATIONS_KEY,
};

#[cfg(test)]
pub(crate) use local_notifier::test_support;
