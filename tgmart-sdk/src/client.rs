//! HTTP client for the storefront API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::{Client, StatusCode};
use url::Url;

use crate::checkout::PlaceOrder;
use crate::objects::{Category, OrderRequest, OrderResponse, Product};

/// Products fetched per catalog page.
pub const PER_PAGE: u32 = 12;

/// Errors produced by the storefront HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed HTTP client for the storefront API the mini-app talks to.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
}

impl StorefrontClient {
    /// Create a new `StorefrontClient` rooted at the mini-app's own origin.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /products` — one catalog page, newest committed page first.
    ///
    /// Only simple products are supported, so the query always pins
    /// `type=simple`. The caller feeds the result into the session reducer,
    /// which discards it if a category switch superseded the fetch.
    pub async fn fetch_products(
        &self,
        page: u32,
        category: Option<i64>,
    ) -> Result<Vec<Product>, ClientError> {
        let url = self.base_url.join("products")?;
        let mut request = self.http.get(url).query(&[
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
            ("type", "simple".to_owned()),
        ]);
        if let Some(category) = category {
            request = request.query(&[("category", category.to_string())]);
        }
        parse_response(request.send().await?).await
    }

    /// `GET /categories` — the category list for the sidebar.
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        let url = self.base_url.join("categories")?;
        let resp = self
            .http
            .get(url)
            .query(&[("per_page", "30")])
            .send()
            .await?;
        parse_response(resp).await
    }
}

#[async_trait::async_trait]
impl PlaceOrder for StorefrontClient {
    /// `POST /orders` — submit the cart as an order.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderResponse, ClientError> {
        let url = self.base_url.join("orders")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
