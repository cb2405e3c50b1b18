//! Commerce backend integration.
//!
//! Orders are owned by the commerce backend; this process keeps no order
//! state of its own and reaches the backend over HTTP for every call. The
//! [`CommerceBackend`] trait is the seam the server and the webhook
//! handlers depend on, with [`WooClient`] as the production implementation.

mod woo;

pub use woo::WooClient;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tgmart_sdk::objects::{PaymentMethod, ShippingInfo};

/// An order as the commerce backend reports it after creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Opaque key the backend mints per order; echoed in invoice
    /// descriptions for support lookups.
    pub order_key: String,
    /// Settlement currency code, e.g. `"USD"`.
    pub currency: String,
    pub payment_method: String,
    pub line_items: Vec<OrderLineItem>,
}

/// One priced line of a backend order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderLineItem {
    pub name: String,
    pub quantity: u32,
    /// Line total as a decimal string, e.g. `"4.00"`.
    pub total: String,
}

/// One requested line when creating an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// A shipping method configured on a backend shipping zone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShippingMethod {
    #[serde(rename = "method_id")]
    pub id: String,
    #[serde(rename = "method_title")]
    pub title: String,
    pub enabled: bool,
}

/// Errors produced by commerce backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("backend error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// The commerce backend operations this system needs.
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Create an unpaid order from the requested lines. Not idempotent:
    /// every call creates a new backend order.
    async fn create_order(
        &self,
        items: &[NewLineItem],
        customer_note: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order, BackendError>;

    /// Push shipping and billing details onto an existing order.
    async fn update_order_info(
        &self,
        order_id: i64,
        info: &ShippingInfo,
    ) -> Result<(), BackendError>;

    /// Mark an existing order as paid.
    async fn set_order_paid(&self, order_id: i64) -> Result<(), BackendError>;

    /// All shipping methods configured for a zone, enabled or not.
    async fn shipping_methods(&self, zone_id: i64) -> Result<Vec<ShippingMethod>, BackendError>;
}
