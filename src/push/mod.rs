//! Outbound push notifications module

mod delivery;
mod message;
mod provider;
mod token;

pub use delivery::send_in_chunks;
pub use message::{chunk_messages, PushMessage, MAX_MESSAGES_PER_CHUNK};
pub use provider::{ExpoPushClient, PushProvider, EXPO_PUSH_API_URL};
pub use token::is_expo_push_token;
