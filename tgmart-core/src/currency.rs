//! Currency minor-unit conversion.
//!
//! The payment gateway prices invoices in integer minor units while the
//! commerce backend reports decimal strings. The exponent table is the
//! subset of gateway-supported currencies this store can settle in; a
//! code missing from it is a configuration gap, never defaulted.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Decimal exponent for a gateway currency code, or `None` when the
/// currency cannot be invoiced.
pub fn currency_exponent(code: &str) -> Option<u32> {
    let exp = match code {
        "AED" | "AUD" | "BRL" | "CAD" | "CHF" | "CNY" | "CZK" | "DKK" | "EUR" | "GBP"
        | "HKD" | "HUF" | "IDR" | "ILS" | "INR" | "KZT" | "MXN" | "MYR" | "NOK" | "NZD"
        | "PHP" | "PLN" | "RUB" | "SEK" | "SGD" | "THB" | "TRY" | "UAH" | "USD" | "ZAR" => 2,
        "JPY" | "KRW" | "VND" => 0,
        "JOD" | "KWD" => 3,
        _ => return None,
    };
    Some(exp)
}

/// Errors converting a backend decimal total into gateway minor units.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    /// The backend total was not a parseable decimal.
    #[error("invalid decimal amount {amount:?}")]
    Parse {
        amount: String,
        source: rust_decimal::Error,
    },

    /// The total has more precision than the currency carries, or does not
    /// fit the gateway's integer range.
    #[error("amount {amount:?} not representable with exponent {exponent}")]
    NotRepresentable { amount: String, exponent: u32 },
}

/// Convert a decimal total (e.g. `"4.00"`) into minor units (e.g. `400`).
pub fn to_minor_units(total: &str, exponent: u32) -> Result<i64, AmountError> {
    let amount: Decimal = total.trim().parse().map_err(|source| AmountError::Parse {
        amount: total.to_owned(),
        source,
    })?;
    let scaled = amount * Decimal::from(10i64.pow(exponent));
    if scaled.fract() != Decimal::ZERO {
        return Err(AmountError::NotRepresentable {
            amount: total.to_owned(),
            exponent,
        });
    }
    scaled.to_i64().ok_or(AmountError::NotRepresentable {
        amount: total.to_owned(),
        exponent,
    })
}

/// Invoice line label for a quantity of one product.
pub fn price_label(name: &str, quantity: u32) -> String {
    format!("{name} (x{quantity})")
}
