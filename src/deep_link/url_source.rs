//! Sources of inbound deep-link URLs.

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Platform integration delivering the URLs the app is opened with.
#[async_trait]
pub trait UrlEventSource: Send + Sync {
    /// The URL the app was launched with, if any. Queried once at startup.
    async fn initial_url(&self) -> Option<String>;

    /// Stream of URLs received while the app is running.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// In-process URL source fed by [`ChannelUrlSource::open_url`].
pub struct ChannelUrlSource {
    initial: Option<String>,
    sender: broadcast::Sender<String>,
}

impl ChannelUrlSource {
    pub fn new(initial: Option<String>) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { initial, sender }
    }

    /// Delivers `url` to every subscriber. Returns false if nobody listens.
    pub fn open_url(&self, url: impl Into<String>) -> bool {
        self.sender.send(url.into()).is_ok()
    }
}

#[async_trait]
impl UrlEventSource for ChannelUrlSource {
    async fn initial_url(&self) -> Option<String> {
        self.initial.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}
