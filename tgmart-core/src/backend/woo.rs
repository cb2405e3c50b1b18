//! WooCommerce REST client.
//!
//! Talks to the store's `wp-json/wc/v3` API. Authentication is two static
//! credential query parameters appended to every call, per the store's
//! REST key setup.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tgmart_sdk::objects::{PaymentMethod, ShippingInfo};
use url::Url;

use super::{BackendError, CommerceBackend, NewLineItem, Order, ShippingMethod};

/// HTTP client for a WooCommerce store.
#[derive(Debug, Clone)]
pub struct WooClient {
    http: Client,
    base_url: Url,
    consumer_key: String,
    consumer_secret: String,
}

impl WooClient {
    /// Create a client for the store at `store_url`.
    ///
    /// `store_url` is the site root; the REST base path is appended here.
    pub fn new(
        store_url: &Url,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let base_url = store_url.join("wp-json/wc/v3/")?;
        Ok(Self {
            http: Client::new(),
            base_url,
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        })
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    fn credentials(&self) -> [(&'static str, &str); 2] {
        [
            ("consumer_key", self.consumer_key.as_str()),
            ("consumer_secret", self.consumer_secret.as_str()),
        ]
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET commerce backend");
        let resp = self
            .http
            .get(url)
            .query(&self.credentials())
            .send()
            .await?;
        parse_response(resp).await
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, method = %method, "Calling commerce backend");
        let resp = self
            .http
            .request(method, url)
            .query(&self.credentials())
            .json(body)
            .send()
            .await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, BackendError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(BackendError::Json)
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    set_paid: bool,
    line_items: Vec<LineItemBody>,
    customer_note: &'a str,
    payment_method: &'a str,
    payment_method_title: &'a str,
}

#[derive(Debug, Serialize)]
struct LineItemBody {
    product_id: i64,
    quantity: u32,
}

/// Shipping and billing blocks in the backend's address shape.
///
/// The collected name goes into both name slots; contact details are
/// billing-only, mirroring what the backend expects on a customer order.
#[derive(Debug, Serialize)]
struct OrderInfoBody<'a> {
    shipping: AddressBody<'a>,
    billing: BillingBody<'a>,
}

#[derive(Debug, Serialize)]
struct AddressBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    address_1: &'a str,
    address_2: Option<&'a str>,
    city: &'a str,
    state: Option<&'a str>,
    postcode: &'a str,
    country: &'a str,
}

#[derive(Debug, Serialize)]
struct BillingBody<'a> {
    #[serde(flatten)]
    address: AddressBody<'a>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SetPaidBody {
    set_paid: bool,
}

fn address_body(info: &ShippingInfo) -> AddressBody<'_> {
    AddressBody {
        first_name: &info.name,
        last_name: &info.name,
        address_1: &info.address.street_line1,
        address_2: info.address.street_line2.as_deref(),
        city: &info.address.city,
        state: info.address.state.as_deref(),
        postcode: &info.address.post_code,
        country: &info.address.country_code,
    }
}

fn order_info_body(info: &ShippingInfo) -> OrderInfoBody<'_> {
    OrderInfoBody {
        shipping: address_body(info),
        billing: BillingBody {
            address: address_body(info),
            email: info.email.as_deref(),
            phone: info.phone.as_deref(),
        },
    }
}

fn method_title(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cod => "Cash on Delivery",
        PaymentMethod::Telegram => "Telegram Payment",
    }
}

#[async_trait]
impl CommerceBackend for WooClient {
    async fn create_order(
        &self,
        items: &[NewLineItem],
        customer_note: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order, BackendError> {
        let body = CreateOrderBody {
            set_paid: false,
            line_items: items
                .iter()
                .map(|item| LineItemBody {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            customer_note,
            payment_method: match payment_method {
                PaymentMethod::Cod => "cod",
                PaymentMethod::Telegram => "telegram",
            },
            payment_method_title: method_title(payment_method),
        };
        self.send_json(reqwest::Method::POST, "orders", &body).await
    }

    async fn update_order_info(
        &self,
        order_id: i64,
        info: &ShippingInfo,
    ) -> Result<(), BackendError> {
        let body = order_info_body(info);
        // The backend echoes the updated order; only success matters here.
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PUT, &format!("orders/{order_id}"), &body)
            .await?;
        Ok(())
    }

    async fn set_order_paid(&self, order_id: i64) -> Result<(), BackendError> {
        let body = SetPaidBody { set_paid: true };
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PUT, &format!("orders/{order_id}"), &body)
            .await?;
        Ok(())
    }

    async fn shipping_methods(&self, zone_id: i64) -> Result<Vec<ShippingMethod>, BackendError> {
        self.get_json(&format!("shipping/zones/{zone_id}/methods"))
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tgmart_sdk::objects::ShippingAddress;

    fn info() -> ShippingInfo {
        ShippingInfo {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: Some("555-0100".into()),
            address: ShippingAddress {
                street_line1: "1 Main St".into(),
                street_line2: Some("Apt 2".into()),
                city: "Hanoi".into(),
                state: None,
                country_code: "VN".into(),
                post_code: "10000".into(),
            },
        }
    }

    #[test]
    fn order_info_maps_name_into_both_slots_and_contacts_into_billing() {
        let value = serde_json::to_value(order_info_body(&info())).unwrap();
        assert_eq!(value["shipping"]["first_name"], "Ada");
        assert_eq!(value["shipping"]["last_name"], "Ada");
        assert_eq!(value["shipping"]["address_1"], "1 Main St");
        assert_eq!(value["shipping"]["postcode"], "10000");
        assert_eq!(value["shipping"]["country"], "VN");
        assert!(value["shipping"].get("email").is_none());
        assert_eq!(value["billing"]["email"], "ada@example.com");
        assert_eq!(value["billing"]["phone"], "555-0100");
        assert_eq!(value["billing"]["address_2"], "Apt 2");
    }

    #[test]
    fn create_order_body_carries_method_label() {
        let body = CreateOrderBody {
            set_paid: false,
            line_items: vec![LineItemBody {
                product_id: 7,
                quantity: 2,
            }],
            customer_note: "ring the bell",
            payment_method: "cod",
            payment_method_title: method_title(PaymentMethod::Cod),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["set_paid"], false);
        assert_eq!(value["payment_method_title"], "Cash on Delivery");
        assert_eq!(value["line_items"][0]["product_id"], 7);
    }

    #[test]
    fn rest_base_path_is_appended_once() {
        let store = Url::parse("https://shop.example.com/").unwrap();
        let client = WooClient::new(&store, "ck", "cs").unwrap();
        let url = client.endpoint("shipping/zones/3/methods").unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.example.com/wp-json/wc/v3/shipping/zones/3/methods"
        );
    }
}
