//! Gateway wire types.
//!
//! Inbound types cover the subset of the update payload the handlers
//! read; unknown fields are ignored on deserialization. Outbound types
//! mirror the corresponding Bot API method parameters.

use serde::{Deserialize, Serialize};
use tgmart_sdk::objects::{ShippingAddress, ShippingInfo};
use url::Url;

// ---------------------------------------------------------------------------
// Inbound (webhook) types
// ---------------------------------------------------------------------------

/// One webhook delivery from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub shipping_query: Option<ShippingQuery>,
    #[serde(default)]
    pub pre_checkout_query: Option<PreCheckoutQuery>,
}

/// A chat message, possibly carrying a successful-payment notification.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub successful_payment: Option<SuccessfulPayment>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// The gateway asks which delivery options apply to an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingQuery {
    pub id: String,
    pub from: User,
    /// Opaque correlation token from invoice creation.
    pub invoice_payload: String,
}

/// The gateway's final confirmation request before charging the user.
#[derive(Debug, Clone, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: i64,
    /// Opaque correlation token from invoice creation.
    pub invoice_payload: String,
    /// Details the gateway collected from the user during its own flow.
    #[serde(default)]
    pub order_info: Option<OrderInfo>,
}

/// User details collected by the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<CollectedAddress>,
}

/// Address shape the gateway collects. All fields arrive, possibly empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectedAddress {
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street_line1: String,
    #[serde(default)]
    pub street_line2: String,
    #[serde(default)]
    pub post_code: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

impl From<OrderInfo> for ShippingInfo {
    fn from(info: OrderInfo) -> Self {
        let address = info.shipping_address.unwrap_or_default();
        ShippingInfo {
            name: info.name.unwrap_or_default(),
            email: info.email.and_then(non_empty),
            phone: info.phone_number.and_then(non_empty),
            address: ShippingAddress {
                street_line1: address.street_line1,
                street_line2: non_empty(address.street_line2),
                city: address.city,
                state: non_empty(address.state),
                country_code: address.country_code,
                post_code: address.post_code,
            },
        }
    }
}

/// Notification that the gateway has charged the user.
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessfulPayment {
    pub currency: String,
    pub total_amount: i64,
    /// Opaque correlation token from invoice creation.
    pub invoice_payload: String,
    pub telegram_payment_charge_id: String,
    pub provider_payment_charge_id: String,
}

// ---------------------------------------------------------------------------
// Outbound (API call) types
// ---------------------------------------------------------------------------

/// One priced line on an invoice, in currency minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledPrice {
    pub label: String,
    pub amount: i64,
}

/// A delivery option offered in answer to a shipping query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingOption {
    pub id: String,
    pub title: String,
    pub prices: Vec<LabeledPrice>,
}

/// Parameters for creating an invoice link.
///
/// The provider token is held by the gateway client and injected at call
/// time; it never travels through handler code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceParams {
    pub title: String,
    pub description: String,
    /// Opaque correlation token echoed back on every webhook round-trip.
    pub payload: String,
    pub currency: String,
    pub prices: Vec<LabeledPrice>,
    pub need_name: bool,
    pub need_email: bool,
    pub need_phone_number: bool,
    pub need_shipping_address: bool,
    pub is_flexible: bool,
}

impl InvoiceParams {
    /// Invoice for a backend order, collecting full contact details
    /// through the gateway's own flow.
    pub fn order_invoice(
        order_id: i64,
        order_key: &str,
        currency: &str,
        prices: Vec<LabeledPrice>,
        payload: String,
    ) -> Self {
        Self {
            title: format!("Order Invoice {order_id}"),
            description: format!("Payment invoice for {order_key}"),
            payload,
            currency: currency.to_owned(),
            prices,
            need_name: true,
            need_email: true,
            need_phone_number: true,
            need_shipping_address: true,
            is_flexible: false,
        }
    }
}

/// A chat message to send, optionally with an inline web-app button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
        }
    }

    /// Message with a single button that opens the store web-app.
    pub fn with_web_app_button(
        chat_id: i64,
        text: impl Into<String>,
        button_label: impl Into<String>,
        web_app_url: &Url,
    ) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: Some(InlineKeyboardMarkup {
                inline_keyboard: vec![vec![InlineKeyboardButton {
                    text: button_label.into(),
                    web_app: WebAppInfo {
                        url: web_app_url.as_str().to_owned(),
                    },
                }]],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub web_app: WebAppInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}
