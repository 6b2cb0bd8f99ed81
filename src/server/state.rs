use axum::extract::FromRef;
use std::sync::Arc;

use crate::push::PushProvider;

use super::token_registry::TokenRegistry;
use super::ServerConfig;

pub type GuardedTokenRegistry = Arc<TokenRegistry>;
pub type GuardedPushProvider = Arc<dyn PushProvider>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub tokens: GuardedTokenRegistry,
    pub push_provider: GuardedPushProvider,
}

impl ServerState {
    pub fn new(config: ServerConfig, push_provider: GuardedPushProvider) -> Self {
        Self {
            config,
            tokens: Arc::new(TokenRegistry::new()),
            push_provider,
        }
    }
}

impl FromRef<ServerState> for GuardedTokenRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.tokens.clone()
    }
}

impl FromRef<ServerState> for GuardedPushProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.push_provider.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
