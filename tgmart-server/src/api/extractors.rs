//! Custom Axum extractors for request authentication.
//!
//! Provides `WebhookAuth`, which verifies the secret token the gateway
//! attaches to every webhook delivery. The token is configured once when
//! the webhook is registered and compared in constant time.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Header the gateway sets on every webhook delivery.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// An Axum extractor that verifies the webhook secret token header.
pub struct WebhookAuth;

/// Errors returned by the [`WebhookAuth`] extractor.
#[derive(Debug)]
pub enum WebhookAuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for WebhookAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookAuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "missing webhook secret token")
            }
            WebhookAuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "webhook secret token mismatch")
            }
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for WebhookAuth {
    type Rejection = WebhookAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SECRET_TOKEN_HEADER)
            .ok_or(WebhookAuthError::MissingToken)?
            .to_str()
            .map_err(|_| WebhookAuthError::InvalidToken)?;

        ring::constant_time::verify_slices_are_equal(
            token.as_bytes(),
            state.webhook_secret.as_bytes(),
        )
        .map_err(|_| WebhookAuthError::InvalidToken)?;

        Ok(WebhookAuth)
    }
}
