//! Deep-link routing module

mod dispatcher;
mod params;
mod routes;
mod url_source;

pub use dispatcher::{DeepLinkDispatcher, DeepLinkHandler, DeepLinkSubscription, DispatchOutcome};
pub use params::{extract_params, DeepLinkParams};
pub use routes::{AppRoute, LoggingNavigator, Navigator};
pub use url_source::{ChannelUrlSource, UrlEventSource};

#[cfg(test)]
pub(crate) use routes::test_support;
