//! Configuration module for tgmart-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables. Store and bot credentials are environment-only
//! so the config file can be committed.

pub mod file;

pub use file::{BackendConfig, FileConfig, GatewayConfig, ServerConfig};

use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Environment variable names for the required secrets.
pub const ENV_CONSUMER_KEY: &str = "WOOCOMMERCE_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "WOOCOMMERCE_CONSUMER_SECRET";
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_PROVIDER_TOKEN: &str = "TELEGRAM_PAYMENT_PROVIDER_TOKEN";
pub const ENV_WEBHOOK_SECRET: &str = "TELEGRAM_WEBHOOK_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
}

/// Credentials pulled from the environment.
#[derive(Clone)]
pub struct Secrets {
    /// Commerce backend REST consumer key.
    pub consumer_key: String,
    /// Commerce backend REST consumer secret.
    pub consumer_secret: String,
    /// Bot token for the gateway API.
    pub bot_token: String,
    /// Payment-provider credential for invoice links.
    pub provider_token: String,
    /// Shared secret echoed on every webhook delivery.
    pub webhook_secret: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub gateway: GatewayConfig,
    pub secrets: Secrets,
}

/// Load the config file, apply CLI overrides and collect env secrets.
pub fn load(path: &Path, listen_override: Option<SocketAddr>) -> Result<LoadedConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let mut file: FileConfig = toml::from_str(&raw)?;

    if let Some(listen) = listen_override {
        file.server.listen = listen;
    }

    Ok(LoadedConfig {
        server: file.server,
        backend: file.backend,
        gateway: file.gateway,
        secrets: Secrets {
            consumer_key: require_env(ENV_CONSUMER_KEY)?,
            consumer_secret: require_env(ENV_CONSUMER_SECRET)?,
            bot_token: require_env(ENV_BOT_TOKEN)?,
            provider_token: require_env(ENV_PROVIDER_TOKEN)?,
            webhook_secret: require_env(ENV_WEBHOOK_SECRET)?,
        },
    })
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}
