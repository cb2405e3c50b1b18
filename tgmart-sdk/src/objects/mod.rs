//! Wire objects shared between the mini-app frontend and the server.

mod catalog;
mod order;
mod shipping;

pub use catalog::{Category, Product, ProductImage};
pub use order::{OrderRequest, OrderRequestItem, OrderResponse, OrderStatus, PaymentMethod};
pub use shipping::{AddressField, MissingField, ShippingAddress, ShippingField, ShippingInfo};
