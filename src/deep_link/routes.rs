//! In-app navigation targets and the navigation sink.

use std::fmt;
use tracing::info;

use crate::notifications::CallKind;

/// Screens a deep link can lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRoute {
    IncomingCall { caller: String, kind: CallKind },
    ActiveCall { caller: String, kind: CallKind },
    Notifications,
}

impl AppRoute {
    /// Router path for this screen, with the caller name URL-encoded.
    pub fn path(&self) -> String {
        match self {
            Self::IncomingCall { caller, kind } => format!(
                "/call/incoming?caller={}&type={}",
                urlencoding::encode(caller),
                kind
            ),
            Self::ActiveCall { caller, kind } => format!(
                "/call/active?caller={}&type={}&status=connected",
                urlencoding::encode(caller),
                kind
            ),
            Self::Notifications => "/(tabs)/notifications".to_string(),
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receives navigation requests produced by deep-link handling.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: AppRoute);
}

/// Navigator for headless hosts: records nothing, logs the target path.
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: AppRoute) {
        info!("Navigating to {}", route);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_call_path_encodes_caller() {
        let route = AppRoute::IncomingCall {
            caller: "John Doe".to_string(),
            kind: CallKind::Voice,
        };
        assert_eq!(route.path(), "/call/incoming?caller=John%20Doe&type=voice");
    }

    #[test]
    fn test_active_call_path() {
        let route = AppRoute::ActiveCall {
            caller: "Jane".to_string(),
            kind: CallKind::Video,
        };
        assert_eq!(
            route.to_string(),
            "/call/active?caller=Jane&type=video&status=connected"
        );
    }

    #[test]
    fn test_notifications_path() {
        assert_eq!(AppRoute::Notifications.path(), "/(tabs)/notifications");
    }
}
