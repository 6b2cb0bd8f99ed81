pub mod config;
mod error;
mod http_layers;
pub mod server;
pub mod state;
mod token_registry;

pub use config::ServerConfig;
pub use error::RelayError;
pub use http_layers::*;
pub use server::run_server;
pub use token_registry::TokenRegistry;
