//! Order orchestration endpoint.
//!
//! `POST /orders` accepts the mini-app's cart and drives the backend and,
//! for gateway payments, the invoice-link creation. Creating the backend
//! order and the follow-up steps are separate calls: a failure after
//! creation leaves the order in place (no compensating rollback, see
//! DESIGN.md).

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tgmart_core::backend::{BackendError, NewLineItem};
use tgmart_core::currency::{AmountError, currency_exponent, price_label, to_minor_units};
use tgmart_core::gateway::types::{InvoiceParams, LabeledPrice};
use tgmart_core::gateway::{GatewayError, InvoicePayload};
use tgmart_sdk::objects::{
    MissingField, OrderRequest, OrderResponse, OrderStatus, PaymentMethod,
};

use crate::state::AppState;

/// `POST /orders` — create a backend order from the submitted cart.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<OrderRequest>,
) -> Result<impl IntoResponse, OrderApiError> {
    let response = place_order(&state, body).await?;
    Ok(Json(response))
}

/// The orchestration itself, separated from the axum plumbing.
///
/// Not idempotent: every call creates a new backend order, so the client
/// must not double-submit.
async fn place_order(state: &AppState, body: OrderRequest) -> Result<OrderResponse, OrderApiError> {
    let items: Vec<NewLineItem> = body
        .items
        .iter()
        .map(|item| NewLineItem {
            product_id: item.id,
            quantity: item.count,
        })
        .collect();

    let order = state
        .backend
        .create_order(
            &items,
            body.comment.as_deref().unwrap_or(""),
            body.payment_method,
        )
        .await
        .map_err(OrderApiError::Backend)?;

    tracing::info!(
        order_id = order.id,
        payment_method = %body.payment_method,
        user_id = ?body.user_id,
        "Created backend order"
    );

    if body.payment_method == PaymentMethod::Cod {
        if let Some(info) = &body.shipping_info {
            // The client validates too; this guards a bypassed client.
            info.validate_for_delivery()
                .map_err(OrderApiError::Validation)?;
            state
                .backend
                .update_order_info(order.id, info)
                .await
                .map_err(OrderApiError::ShippingUpdate)?;
        }
        return Ok(OrderResponse {
            order_id: order.id,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cod,
            invoice_link: None,
        });
    }

    let exponent = currency_exponent(&order.currency)
        .ok_or_else(|| OrderApiError::UnsupportedCurrency(order.currency.clone()))?;

    let prices = order
        .line_items
        .iter()
        .map(|item| {
            let amount = to_minor_units(&item.total, exponent).map_err(OrderApiError::Amount)?;
            Ok(LabeledPrice {
                label: price_label(&item.name, item.quantity),
                amount,
            })
        })
        .collect::<Result<Vec<_>, OrderApiError>>()?;

    let payload = InvoicePayload {
        order_id: order.id,
        shipping_zone: body.shipping_zone,
    }
    .encode()
    .map_err(OrderApiError::Payload)?;

    let invoice = InvoiceParams::order_invoice(
        order.id,
        &order.order_key,
        &order.currency,
        prices,
        payload,
    );
    let invoice_link = state
        .gateway
        .create_invoice_link(&invoice)
        .await
        .map_err(OrderApiError::Gateway)?;

    Ok(OrderResponse {
        order_id: order.id,
        status: OrderStatus::Pending,
        payment_method: PaymentMethod::Telegram,
        invoice_link: Some(invoice_link),
    })
}

/// Errors that can occur while orchestrating an order.
#[derive(Debug)]
pub enum OrderApiError {
    /// A required cash-on-delivery shipping field is missing.
    Validation(MissingField),
    /// The backend rejected order creation.
    Backend(BackendError),
    /// The backend rejected the shipping/billing update. The order has
    /// already been created and is not rolled back.
    ShippingUpdate(BackendError),
    /// The order's settlement currency has no minor-unit exponent.
    UnsupportedCurrency(String),
    /// A line total could not be converted to minor units.
    Amount(AmountError),
    /// The invoice payload could not be serialized.
    Payload(serde_json::Error),
    /// The gateway rejected invoice-link creation.
    Gateway(GatewayError),
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            OrderApiError::Validation(field) => (
                StatusCode::BAD_REQUEST,
                format!("missing required shipping information: {field}"),
            )
                .into_response(),
            OrderApiError::Backend(e) => {
                tracing::error!(error = %e, "Order creation failed");
                (StatusCode::BAD_GATEWAY, "commerce backend error").into_response()
            }
            OrderApiError::ShippingUpdate(e) => {
                tracing::error!(error = %e, "Shipping update failed after order creation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to update shipping information",
                )
                    .into_response()
            }
            OrderApiError::UnsupportedCurrency(currency) => {
                tracing::error!(currency = %currency, "No minor-unit exponent for settlement currency");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unsupported settlement currency",
                )
                    .into_response()
            }
            OrderApiError::Amount(e) => {
                tracing::error!(error = %e, "Line total not representable in minor units");
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid order amount").into_response()
            }
            OrderApiError::Payload(e) => {
                tracing::error!(error = %e, "Invoice payload serialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            OrderApiError::Gateway(e) => {
                tracing::error!(error = %e, "Invoice link creation failed");
                (StatusCode::BAD_GATEWAY, "payment gateway error").into_response()
            }
        }
    }
}
