//! Payment gateway integration (Telegram Bot API).
//!
//! The gateway is both a client target (invoice links, query answers,
//! chat messages) and a webhook source (the update types in [`types`]).
//! [`PaymentGateway`] is the seam the server handlers depend on, with
//! [`BotApi`] as the production implementation.

mod bot;
mod payload;
pub mod types;

pub use bot::BotApi;
pub use payload::InvoicePayload;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use types::{InvoiceParams, OutgoingMessage, ShippingOption};

/// Errors produced by gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the call.
    #[error("gateway error: status {status}, description: {description}")]
    Api {
        status: StatusCode,
        description: String,
    },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API root could not be joined with the method path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Synchronous answer to a shipping-option query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingQueryAnswer {
    /// Offer these delivery options.
    Options(Vec<ShippingOption>),
    /// Refuse delivery with a user-facing explanation.
    Reject { message: String },
}

/// Synchronous answer to a pre-checkout query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreCheckoutAnswer {
    /// Let the payment proceed.
    Ok,
    /// Stop the payment with a user-facing explanation. This is the last
    /// point at which the payment can be stopped.
    Reject { message: String },
}

/// The payment-gateway operations this system needs.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payable invoice link for an order.
    async fn create_invoice_link(&self, invoice: &InvoiceParams) -> Result<String, GatewayError>;

    /// Answer a shipping-option query.
    async fn answer_shipping_query(
        &self,
        query_id: &str,
        answer: ShippingQueryAnswer,
    ) -> Result<(), GatewayError>;

    /// Answer a pre-checkout query.
    async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        answer: PreCheckoutAnswer,
    ) -> Result<(), GatewayError>;

    /// Send a chat message.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError>;

    /// Install the store web-app as the chat's menu button.
    async fn set_chat_menu_button(
        &self,
        chat_id: i64,
        text: &str,
        web_app_url: &Url,
    ) -> Result<(), GatewayError>;

    /// Point the gateway's webhook at this deployment.
    async fn set_webhook(&self, url: &Url, secret_token: &str) -> Result<(), GatewayError>;
}
