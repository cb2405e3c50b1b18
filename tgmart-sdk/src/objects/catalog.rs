//! Catalog snapshot types.
//!
//! These mirror the subset of the commerce backend's product and category
//! fields the mini-app renders. The catalog endpoints themselves live
//! outside this repository; the types are the contract the client consumes.

use serde::{Deserialize, Serialize};

/// A product as listed by the catalog endpoint.
///
/// Prices are decimal strings in the store currency, passed through for
/// display; the backend recomputes totals at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub price: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// A single product image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub src: String,
}

/// A product category with its listing count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub count: u32,
}
