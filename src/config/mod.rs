mod file_config;

pub use file_config::FileConfig;

use crate::push::EXPO_PUSH_API_URL;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub push_api_url: Option<String>,
    pub push_timeout_sec: u64,
    pub no_cors: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            logging_level: RequestsLoggingLevel::default(),
            push_api_url: None,
            push_timeout_sec: 30,
            no_cors: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub push_api_url: String,
    pub push_timeout_sec: u64,
    pub cors_enabled: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let push_api_url = file
            .push_api_url
            .or_else(|| cli.push_api_url.clone())
            .unwrap_or_else(|| EXPO_PUSH_API_URL.to_string());
        if !push_api_url.starts_with("http://") && !push_api_url.starts_with("https://") {
            bail!("push_api_url must be an http(s) URL: {}", push_api_url);
        }

        let push_timeout_sec = file.push_timeout_sec.unwrap_or(cli.push_timeout_sec);
        if push_timeout_sec == 0 {
            bail!("push_timeout_sec must be greater than zero");
        }

        let cors_enabled = file.cors_enabled.unwrap_or(!cli.no_cors);

        Ok(Self {
            port,
            logging_level,
            push_api_url,
            push_timeout_sec,
            cors_enabled,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            cors_enabled: self.cors_enabled,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
