//! Application state shared across all request handlers.

use std::sync::Arc;
use tgmart_core::backend::CommerceBackend;
use tgmart_core::gateway::PaymentGateway;
use url::Url;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
/// Both integrations sit behind traits so handlers run against test
/// doubles.
#[derive(Clone)]
pub struct AppState {
    /// Commerce backend (system of record for orders).
    pub backend: Arc<dyn CommerceBackend>,
    /// Payment gateway (invoice links, query answers, chat messages).
    pub gateway: Arc<dyn PaymentGateway>,
    /// Shared secret expected on every webhook delivery.
    pub webhook_secret: Arc<str>,
    /// Public URL of the mini-app, used by bot commands.
    pub app_url: Arc<Url>,
}

impl AppState {
    /// Create a new AppState over the given integrations.
    pub fn new(
        backend: Arc<dyn CommerceBackend>,
        gateway: Arc<dyn PaymentGateway>,
        webhook_secret: &str,
        app_url: Url,
    ) -> Self {
        Self {
            backend,
            gateway,
            webhook_secret: Arc::from(webhook_secret),
            app_url: Arc::new(app_url),
        }
    }
}
