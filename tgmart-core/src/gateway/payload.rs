//! Invoice payload — the correlation token carried through the gateway.
//!
//! This is the only channel that carries order identity across the
//! gateway's webhook round-trips, so every handler parses it strictly: a
//! payload that is malformed, or was minted by some other bot, is
//! rejected rather than guessed at.

use serde::{Deserialize, Serialize};

/// Order identity embedded in an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InvoicePayload {
    pub order_id: i64,
    pub shipping_zone: i64,
}

impl InvoicePayload {
    /// Serialize for the gateway's opaque payload field.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a payload echoed back by the gateway.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
