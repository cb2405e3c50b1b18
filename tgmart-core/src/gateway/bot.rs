//! Telegram Bot API client.
//!
//! Every method call is `POST {api_root}/bot{token}/{method}` with a JSON
//! body; responses arrive in the `{ok, result, description}` envelope.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::types::{InvoiceParams, OutgoingMessage, ShippingOption};
use super::{GatewayError, PaymentGateway, PreCheckoutAnswer, ShippingQueryAnswer};

/// HTTP client for one bot on the Telegram Bot API.
#[derive(Clone)]
pub struct BotApi {
    http: Client,
    api_root: Url,
    token: String,
    provider_token: String,
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens stay out of logs.
        f.debug_struct("BotApi")
            .field("api_root", &self.api_root.as_str())
            .finish_non_exhaustive()
    }
}

impl BotApi {
    /// Create a client for the bot identified by `token`.
    ///
    /// `provider_token` is the payment-provider credential used when
    /// creating invoice links.
    pub fn new(
        api_root: Url,
        token: impl Into<String>,
        provider_token: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_root,
            token: token.into(),
            provider_token: provider_token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn method_url(&self, method: &str) -> Result<Url, url::ParseError> {
        // Built segment-wise: the token contains a colon, which `join`
        // would misread as a URL scheme.
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&format!("bot{}", self.token))
            .push(method);
        Ok(url)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, GatewayError> {
        let url = self.method_url(method)?;
        tracing::debug!(method, "Calling payment gateway");
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        if !envelope.ok {
            return Err(GatewayError::Api {
                status,
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            });
        }
        envelope.result.ok_or(GatewayError::Api {
            status,
            description: "ok response without result".to_owned(),
        })
    }
}

/// The gateway's standard response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct CreateInvoiceLinkBody<'a> {
    provider_token: &'a str,
    #[serde(flatten)]
    invoice: &'a InvoiceParams,
}

#[derive(Serialize)]
struct AnswerShippingQueryBody<'a> {
    shipping_query_id: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_options: Option<&'a [ShippingOption]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
}

#[derive(Serialize)]
struct AnswerPreCheckoutQueryBody<'a> {
    pre_checkout_query_id: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
}

#[derive(Serialize)]
struct SetChatMenuButtonBody<'a> {
    chat_id: i64,
    menu_button: MenuButton<'a>,
}

#[derive(Serialize)]
struct MenuButton<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
    web_app: WebAppUrl<'a>,
}

#[derive(Serialize)]
struct WebAppUrl<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct SetWebhookBody<'a> {
    url: &'a str,
    secret_token: &'a str,
    allowed_updates: [&'a str; 3],
}

#[async_trait]
impl PaymentGateway for BotApi {
    async fn create_invoice_link(&self, invoice: &InvoiceParams) -> Result<String, GatewayError> {
        let body = CreateInvoiceLinkBody {
            provider_token: &self.provider_token,
            invoice,
        };
        self.call("createInvoiceLink", &body).await
    }

    async fn answer_shipping_query(
        &self,
        query_id: &str,
        answer: ShippingQueryAnswer,
    ) -> Result<(), GatewayError> {
        let body = match &answer {
            ShippingQueryAnswer::Options(options) => AnswerShippingQueryBody {
                shipping_query_id: query_id,
                ok: true,
                shipping_options: Some(options),
                error_message: None,
            },
            ShippingQueryAnswer::Reject { message } => AnswerShippingQueryBody {
                shipping_query_id: query_id,
                ok: false,
                shipping_options: None,
                error_message: Some(message),
            },
        };
        let _: bool = self.call("answerShippingQuery", &body).await?;
        Ok(())
    }

    async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        answer: PreCheckoutAnswer,
    ) -> Result<(), GatewayError> {
        let body = match &answer {
            PreCheckoutAnswer::Ok => AnswerPreCheckoutQueryBody {
                pre_checkout_query_id: query_id,
                ok: true,
                error_message: None,
            },
            PreCheckoutAnswer::Reject { message } => AnswerPreCheckoutQueryBody {
                pre_checkout_query_id: query_id,
                ok: false,
                error_message: Some(message),
            },
        };
        let _: bool = self.call("answerPreCheckoutQuery", &body).await?;
        Ok(())
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError> {
        // sendMessage returns the sent Message object; only delivery matters.
        let _: serde_json::Value = self.call("sendMessage", message).await?;
        Ok(())
    }

    async fn set_chat_menu_button(
        &self,
        chat_id: i64,
        text: &str,
        web_app_url: &Url,
    ) -> Result<(), GatewayError> {
        let body = SetChatMenuButtonBody {
            chat_id,
            menu_button: MenuButton {
                kind: "web_app",
                text,
                web_app: WebAppUrl {
                    url: web_app_url.as_str(),
                },
            },
        };
        let _: bool = self.call("setChatMenuButton", &body).await?;
        Ok(())
    }

    async fn set_webhook(&self, url: &Url, secret_token: &str) -> Result<(), GatewayError> {
        let body = SetWebhookBody {
            url: url.as_str(),
            secret_token,
            allowed_updates: ["message", "shipping_query", "pre_checkout_query"],
        };
        let _: bool = self.call("setWebhook", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gateway::types::LabeledPrice;

    #[test]
    fn method_url_embeds_the_token() {
        let api = BotApi::new(
            Url::parse("https://api.telegram.org/").unwrap(),
            "123:abc",
            "prov",
        );
        let url = api.method_url("createInvoiceLink").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.telegram.org/bot123:abc/createInvoiceLink"
        );
    }

    #[test]
    fn invoice_body_flattens_params_next_to_provider_token() {
        let invoice = InvoiceParams::order_invoice(
            17,
            "wc_order_abc",
            "USD",
            vec![LabeledPrice {
                label: "Tea (x2)".into(),
                amount: 400,
            }],
            r#"{"orderId":17,"shippingZone":1}"#.into(),
        );
        let body = CreateInvoiceLinkBody {
            provider_token: "prov",
            invoice: &invoice,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["provider_token"], "prov");
        assert_eq!(value["title"], "Order Invoice 17");
        assert_eq!(value["description"], "Payment invoice for wc_order_abc");
        assert_eq!(value["prices"][0]["amount"], 400);
        assert_eq!(value["need_phone_number"], true);
        assert_eq!(value["is_flexible"], false);
    }

    #[test]
    fn rejection_bodies_carry_only_the_message() {
        let body = AnswerShippingQueryBody {
            shipping_query_id: "q1",
            ok: false,
            shipping_options: None,
            error_message: Some("No shipping option available at your zone!"),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["ok"], false);
        assert!(value.get("shipping_options").is_none());
        assert_eq!(
            value["error_message"],
            "No shipping option available at your zone!"
        );
    }
}
