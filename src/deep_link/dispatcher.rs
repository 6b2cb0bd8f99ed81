//! Deep-link dispatch.
//!
//! Routes are `(pattern, handler)` pairs tried in registration order; the
//! first pattern that matches the raw URL wins and no other route runs. When
//! nothing matches, a fixed default policy looks at the URL text:
//! `/call/` with `caller` and `type` parameters opens the incoming call
//! screen, `/notifications` opens the notifications list, anything else is
//! ignored.
//!
//! Handlers run synchronously on the dispatching thread. A panicking handler
//! is not caught here.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::notifications::CallKind;

use super::params::{extract_params, strip_query, DeepLinkParams};
use super::routes::{AppRoute, Navigator};
use super::url_source::UrlEventSource;

lazy_static! {
    static ref INCOMING_CALL_PATTERN: Regex = Regex::new(r"myapp://call/incoming").unwrap();
    static ref ACTIVE_CALL_PATTERN: Regex = Regex::new(r"myapp://call/active").unwrap();
    static ref NOTIFICATIONS_PATTERN: Regex = Regex::new(r"myapp://notifications").unwrap();
}

pub type DeepLinkHandler = Arc<dyn Fn(&DeepLinkParams) + Send + Sync>;

struct DeepLinkRoute {
    pattern: Regex,
    handler: DeepLinkHandler,
}

/// What happened to a dispatched URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A registered route matched; holds its registration index.
    Route(usize),
    /// No route matched and the default policy navigated somewhere.
    Default,
    /// Nothing happened.
    Ignored,
}

pub struct DeepLinkDispatcher {
    routes: RwLock<Vec<DeepLinkRoute>>,
    navigator: Arc<dyn Navigator>,
}

impl DeepLinkDispatcher {
    /// Creates a dispatcher with an empty route table.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            navigator,
        }
    }

    /// Creates a dispatcher with the app's built-in routes registered.
    pub fn with_default_routes(navigator: Arc<dyn Navigator>) -> Self {
        let dispatcher = Self::new(navigator);
        dispatcher.register_default_routes();
        dispatcher
    }

    /// Appends a route. Re-registering a pattern adds a second,
    /// lower-priority entry.
    pub fn register_handler<F>(&self, pattern: Regex, handler: F)
    where
        F: Fn(&DeepLinkParams) + Send + Sync + 'static,
    {
        debug!("Registering deep link route {}", pattern);
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(DeepLinkRoute {
                pattern,
                handler: Arc::new(handler),
            });
    }

    /// Registers the call and notifications routes under the `myapp://` scheme.
    pub fn register_default_routes(&self) {
        let navigator = self.navigator.clone();
        self.register_handler(INCOMING_CALL_PATTERN.clone(), move |params| {
            if let Some((caller, kind)) = call_params(params) {
                navigator.navigate(AppRoute::IncomingCall { caller, kind });
            }
        });

        let navigator = self.navigator.clone();
        self.register_handler(ACTIVE_CALL_PATTERN.clone(), move |params| {
            if let Some((caller, kind)) = call_params(params) {
                navigator.navigate(AppRoute::ActiveCall { caller, kind });
            }
        });

        let navigator = self.navigator.clone();
        self.register_handler(NOTIFICATIONS_PATTERN.clone(), move |_| {
            navigator.navigate(AppRoute::Notifications);
        });
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Dispatches `url` to at most one handler.
    pub fn handle_deep_link(&self, url: &str) -> DispatchOutcome {
        debug!("Handling deep link: {}", url);

        let Some(params) = extract_params(url) else {
            debug!("Ignoring unparsable deep link: {}", url);
            return DispatchOutcome::Ignored;
        };

        // Clone the handler out so it runs without the route table locked.
        let matched = self
            .routes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .enumerate()
            .find(|(_, route)| route.pattern.is_match(url))
            .map(|(index, route)| (index, route.handler.clone()));

        if let Some((index, handler)) = matched {
            handler(&params);
            return DispatchOutcome::Route(index);
        }

        self.handle_default_link(url, &params)
    }

    fn handle_default_link(&self, url: &str, params: &DeepLinkParams) -> DispatchOutcome {
        let location = strip_query(url);
        if location.contains("/call/") {
            if let Some((caller, kind)) = call_params(params) {
                self.navigator
                    .navigate(AppRoute::IncomingCall { caller, kind });
                return DispatchOutcome::Default;
            }
        } else if location.contains("/notifications") {
            self.navigator.navigate(AppRoute::Notifications);
            return DispatchOutcome::Default;
        }
        debug!("No route for deep link: {}", url);
        DispatchOutcome::Ignored
    }

    /// Dispatches the launch URL, then every URL `source` delivers until the
    /// returned subscription is disposed or dropped.
    pub fn initialize(self: &Arc<Self>, source: Arc<dyn UrlEventSource>) -> DeepLinkSubscription {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let dispatcher = Arc::clone(self);
        // Subscribe before awaiting the launch URL so nothing is missed.
        let mut receiver = source.subscribe();

        let handle = tokio::spawn(async move {
            if let Some(url) = source.initial_url().await {
                dispatcher.handle_deep_link(&url);
            }
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    received = receiver.recv() => match received {
                        Ok(url) => {
                            dispatcher.handle_deep_link(&url);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Deep link listener lagged, {} URLs dropped", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            debug!("Deep link listener stopped");
        });

        DeepLinkSubscription {
            cancel,
            handle: Some(handle),
        }
    }
}

fn call_params(params: &DeepLinkParams) -> Option<(String, CallKind)> {
    let caller = params.get("caller").filter(|c| !c.is_empty())?;
    let kind = match params.get("type")?.parse::<CallKind>() {
        Ok(kind) => kind,
        Err(err) => {
            debug!("{}", err);
            return None;
        }
    };
    Some((caller.clone(), kind))
}

/// Keeps the URL listener alive. Dropping it stops the listener.
pub struct DeepLinkSubscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl DeepLinkSubscription {
    /// Stops the listener and waits for it to finish.
    pub async fn dispose(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!("Deep link listener ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for DeepLinkSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
