//! TOML file configuration structures.
//!
//! These structs directly map to the `tgmart-config.toml` file format.
//! Credentials never live in the file; they come from the environment
//! (see [`super::Secrets`]).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub gateway: GatewayConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Commerce backend section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Store site root; the REST base path is derived from it.
    pub store_url: Url,
}

/// Payment gateway section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bot API root. Overridable for self-hosted API servers.
    #[serde(default = "default_api_root")]
    pub api_root: Url,
    /// Public base URL of this deployment; serves the mini-app and
    /// receives the gateway webhook.
    pub app_url: Url,
}

fn default_api_root() -> Url {
    Url::parse("https://api.telegram.org/").expect("valid default API root")
}
