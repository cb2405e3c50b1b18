//! Gateway webhook endpoint.
//!
//! One route receives every update kind the webhook subscribes to and
//! fans out to the handshake handlers and the bot commands. The handlers
//! are stateless: each call correlates back to a backend order through
//! the invoice payload, and all shared state lives in the backend.
//!
//! The gateway sequences events per invoice itself (no payment
//! confirmation before an accepted pre-checkout); that ordering is
//! trusted, not re-verified here.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tgmart_core::backend::{BackendError, CommerceBackend};
use tgmart_core::gateway::types::{
    LabeledPrice, OutgoingMessage, PreCheckoutQuery, ShippingOption, ShippingQuery,
    SuccessfulPayment, Update,
};
use tgmart_core::gateway::{
    GatewayError, InvoicePayload, PaymentGateway, PreCheckoutAnswer, ShippingQueryAnswer,
};
use tgmart_sdk::objects::ShippingInfo;

use crate::api::extractors::WebhookAuth;
use crate::state::AppState;

/// `POST /telegram/webhook` — receive one gateway update.
///
/// Errors map to 500 so the gateway redelivers the update; everything the
/// user should see is answered through the gateway API before returning.
pub async fn handle_update(
    State(state): State<AppState>,
    _auth: WebhookAuth,
    Json(update): Json<Update>,
) -> Result<StatusCode, WebhookError> {
    dispatch(&state, update).await?;
    Ok(StatusCode::OK)
}

async fn dispatch(state: &AppState, update: Update) -> Result<(), WebhookError> {
    let backend = state.backend.as_ref();
    let gateway = state.gateway.as_ref();

    if let Some(query) = update.shipping_query {
        return handle_shipping_query(backend, gateway, query).await;
    }
    if let Some(query) = update.pre_checkout_query {
        return handle_pre_checkout(backend, gateway, query).await;
    }
    if let Some(message) = update.message {
        if let Some(payment) = message.successful_payment {
            return handle_successful_payment(backend, gateway, message.chat.id, payment).await;
        }
        if let Some(text) = message.text.as_deref() {
            return handle_command(state, message.chat.id, text).await;
        }
    }
    tracing::debug!(update_id = update.update_id, "Ignoring unsupported update kind");
    Ok(())
}

/// Shipping-option query: offer the zone's enabled methods.
async fn handle_shipping_query(
    backend: &dyn CommerceBackend,
    gateway: &dyn PaymentGateway,
    query: ShippingQuery,
) -> Result<(), WebhookError> {
    let answer = match InvoicePayload::parse(&query.invoice_payload) {
        Ok(payload) => {
            let methods = backend
                .shipping_methods(payload.shipping_zone)
                .await
                .map_err(WebhookError::Backend)?;
            let options: Vec<ShippingOption> = methods
                .into_iter()
                .filter(|method| method.enabled)
                .map(|method| ShippingOption {
                    id: method.id,
                    title: method.title,
                    // TODO: price from the backend shipping method; the
                    // zone config carries no cost fields yet.
                    prices: vec![LabeledPrice {
                        label: "Free".to_owned(),
                        amount: 0,
                    }],
                })
                .collect();
            if options.is_empty() {
                ShippingQueryAnswer::Reject {
                    message: "No shipping option available at your zone!".to_owned(),
                }
            } else {
                ShippingQueryAnswer::Options(options)
            }
        }
        Err(e) => {
            tracing::warn!(query_id = %query.id, error = %e, "Unparseable shipping-query payload");
            ShippingQueryAnswer::Reject {
                message: "This invoice cannot be processed.".to_owned(),
            }
        }
    };
    gateway
        .answer_shipping_query(&query.id, answer)
        .await
        .map_err(WebhookError::Gateway)
}

/// Pre-checkout validation: the last point at which the payment can be
/// stopped.
async fn handle_pre_checkout(
    backend: &dyn CommerceBackend,
    gateway: &dyn PaymentGateway,
    query: PreCheckoutQuery,
) -> Result<(), WebhookError> {
    let answer = match InvoicePayload::parse(&query.invoice_payload) {
        Ok(payload) => {
            let info: ShippingInfo = query.order_info.clone().map(Into::into).unwrap_or_default();
            if let Err(field) = info.validate_for_delivery() {
                tracing::warn!(
                    order_id = payload.order_id,
                    missing = %field,
                    "Pre-checkout order info incomplete"
                );
                PreCheckoutAnswer::Reject {
                    message: "Please provide complete shipping information!".to_owned(),
                }
            } else {
                match backend.update_order_info(payload.order_id, &info).await {
                    Ok(()) => PreCheckoutAnswer::Ok,
                    Err(e) => {
                        tracing::error!(
                            order_id = payload.order_id,
                            error = %e,
                            "Order update failed during pre-checkout"
                        );
                        PreCheckoutAnswer::Reject {
                            message: "Problem occurred during order update. \
                                      Please try again or contact support."
                                .to_owned(),
                        }
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(query_id = %query.id, error = %e, "Unparseable pre-checkout payload");
            PreCheckoutAnswer::Reject {
                message: "This invoice cannot be processed.".to_owned(),
            }
        }
    };
    gateway
        .answer_pre_checkout_query(&query.id, answer)
        .await
        .map_err(WebhookError::Gateway)
}

/// Payment confirmation: mark the backend order paid.
///
/// The money has already moved when this fires, so every failure path is
/// terminal and replies with the identifiers a human operator needs to
/// reconcile manually.
async fn handle_successful_payment(
    backend: &dyn CommerceBackend,
    gateway: &dyn PaymentGateway,
    chat_id: i64,
    payment: SuccessfulPayment,
) -> Result<(), WebhookError> {
    let text = match InvoicePayload::parse(&payment.invoice_payload) {
        Ok(payload) => match backend.set_order_paid(payload.order_id).await {
            Ok(()) => {
                tracing::info!(order_id = payload.order_id, "Order marked paid");
                "Order successfully registered!".to_owned()
            }
            Err(e) => {
                tracing::error!(
                    order_id = payload.order_id,
                    error = %e,
                    "Failed to mark order paid after confirmed payment"
                );
                reconciliation_message(Some(payload.order_id), &payment)
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Unparseable payload on a confirmed payment");
            reconciliation_message(None, &payment)
        }
    };
    gateway
        .send_message(&OutgoingMessage::text(chat_id, text))
        .await
        .map_err(WebhookError::Gateway)
}

fn reconciliation_message(order_id: Option<i64>, payment: &SuccessfulPayment) -> String {
    let order = order_id.map_or_else(|| "unknown".to_owned(), |id| id.to_string());
    format!(
        "Error registering payment, contact support!\n\
         order: {order}\n\
         payment: {}\n\
         provider: {}",
        payment.telegram_payment_charge_id, payment.provider_payment_charge_id,
    )
}

/// Bot commands outside the payment flow.
async fn handle_command(state: &AppState, chat_id: i64, text: &str) -> Result<(), WebhookError> {
    let gateway = state.gateway.as_ref();
    let command = text.split_whitespace().next().unwrap_or_default();
    match command {
        "/start" => gateway
            .send_message(&OutgoingMessage::with_web_app_button(
                chat_id,
                "Let's get started ;)",
                "View Menu",
                &state.app_url,
            ))
            .await
            .map_err(WebhookError::Gateway),
        "/help" => gateway
            .send_message(&OutgoingMessage::text(
                chat_id,
                "Try the /start or /menu command!",
            ))
            .await
            .map_err(WebhookError::Gateway),
        "/menu" => gateway
            .set_chat_menu_button(chat_id, "Store", &state.app_url)
            .await
            .map_err(WebhookError::Gateway),
        _ => gateway
            .send_message(&OutgoingMessage::text(
                chat_id,
                "Hi, I'm the store bot. It's nice to meet you! :) /help",
            ))
            .await
            .map_err(WebhookError::Gateway),
    }
}

/// Errors that can occur while processing a webhook update.
#[derive(Debug)]
pub enum WebhookError {
    /// A commerce backend call failed before an answer could be formed.
    Backend(BackendError),
    /// Delivering the answer through the gateway failed.
    Gateway(GatewayError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> axum::response::Response {
        match self {
            WebhookError::Backend(e) => {
                tracing::error!(error = %e, "Webhook backend call failed");
            }
            WebhookError::Gateway(e) => {
                tracing::error!(error = %e, "Webhook answer delivery failed");
            }
        }
        // 500 tells the gateway to redeliver the update.
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}
