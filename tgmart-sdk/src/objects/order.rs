//! Order request and response types.
//!
//! These types are the contract between the mini-app and the order
//! endpoint. The top-level request keys are camelCase on the wire;
//! address fields keep the gateway's snake_case shape.

use serde::{Deserialize, Serialize};

use super::shipping::ShippingInfo;

/// How the order is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Settled outside the system when the order is delivered.
    Cod,
    /// Collected in-chat through the gateway's invoice flow.
    Telegram,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::Telegram => write!(f, "telegram"),
        }
    }
}

/// One cart line in an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestItem {
    pub id: i64,
    pub count: u32,
}

/// Request body for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderRequestItem>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub shipping_zone: i64,
    /// Present only for cash-on-delivery orders; gateway payments collect
    /// the address through the gateway's own flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_info: Option<ShippingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
}

/// Order status as reported to the client.
///
/// Orders are always reported as pending at creation time; settlement is
/// reconciled asynchronously through the gateway handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
}

/// Response returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Present only for gateway payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_link: Option<String>,
}
