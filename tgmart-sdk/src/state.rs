//! Client-side session state machine.
//!
//! The mini-app holds one [`SessionState`] per session and mutates it only
//! by dispatching [`Action`]s through [`reduce`]. The reducer is a pure
//! function: it consumes the current state and returns the next one, which
//! keeps replay and race reasoning trivial even though catalog fetches
//! complete in arbitrary order.

use std::collections::BTreeMap;

use crate::objects::{
    AddressField, Category, PaymentMethod, Product, ShippingAddress, ShippingField, ShippingInfo,
};

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Browsing the catalog.
    Storefront,
    /// Reviewing the cart before checkout.
    Order,
    /// Looking at a single product.
    Item,
}

/// A product in the cart with its quantity.
///
/// The product is an owned snapshot taken when the item was added, not an
/// index into the catalog list — catalog pages are replaced wholesale on
/// refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product: Product,
    pub count: u32,
}

/// The whole per-session client state.
///
/// Created once per app session, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub mode: Mode,
    pub loading: bool,
    pub products: Vec<Product>,
    pub page: u32,
    pub has_more: bool,
    pub categories: Vec<Category>,
    pub selected_category: Option<Category>,
    pub selected_product: Option<Product>,
    pub cart: BTreeMap<i64, CartItem>,
    pub comment: Option<String>,
    pub shipping_zone: i64,
    pub payment_method: PaymentMethod,
    pub shipping_info: ShippingInfo,
}

impl SessionState {
    /// Fresh session with guest defaults.
    pub fn new(user_name: Option<&str>) -> Self {
        Self {
            mode: Mode::Storefront,
            loading: true,
            products: Vec::new(),
            page: 0,
            has_more: true,
            categories: Vec::new(),
            selected_category: None,
            selected_product: None,
            cart: BTreeMap::new(),
            comment: None,
            shipping_zone: 1,
            payment_method: PaymentMethod::Cod,
            shipping_info: ShippingInfo {
                name: user_name.unwrap_or("Guest").to_owned(),
                email: None,
                phone: None,
                address: ShippingAddress {
                    street_line1: String::new(),
                    street_line2: None,
                    city: String::new(),
                    state: None,
                    country_code: "US".to_owned(),
                    post_code: String::new(),
                },
            },
        }
    }

    /// Quantity of a product currently in the cart.
    pub fn quantity(&self, product_id: i64) -> u32 {
        self.cart.get(&product_id).map_or(0, |item| item.count)
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetMode(Mode),
    /// Enter item mode with a snapshot of the product being viewed.
    ViewItem(Product),
    /// A catalog fetch has started.
    CatalogLoading,
    /// A catalog page arrived. Discarded as stale unless it belongs to the
    /// currently selected category and directly follows the committed page.
    ReplaceCatalogPage {
        products: Vec<Product>,
        has_more: bool,
        page: u32,
        category_id: Option<i64>,
    },
    SetCategories(Vec<Category>),
    /// Toggle category selection; always resets pagination so in-flight
    /// fetches for the previous selection are discarded on arrival.
    SelectCategory(Category),
    Increment(Product),
    Decrement(i64),
    SetComment(String),
    SetPaymentMethod(PaymentMethod),
    SetShippingField(ShippingField, String),
    SetShippingAddressField(AddressField, String),
}

/// Apply one action, producing the next state.
pub fn reduce(state: SessionState, action: Action) -> SessionState {
    let mut next = state;
    match action {
        Action::SetMode(mode) => next.mode = mode,
        Action::ViewItem(product) => {
            next.selected_product = Some(product);
            next.mode = Mode::Item;
        }
        Action::CatalogLoading => next.loading = true,
        Action::ReplaceCatalogPage {
            products,
            has_more,
            page,
            category_id,
        } => {
            let selected = next.selected_category.as_ref().map(|c| c.id);
            // A response for another category, or one that does not directly
            // follow the committed page, lost a race with a newer fetch.
            if selected != category_id || next.page + 1 != page {
                return next;
            }
            next.products.extend(products);
            next.page = page;
            next.has_more = has_more;
            next.loading = false;
        }
        Action::SetCategories(categories) => next.categories = categories,
        Action::SelectCategory(category) => {
            next.products.clear();
            next.page = 0;
            next.has_more = true;
            next.loading = true;
            let already_selected = next
                .selected_category
                .as_ref()
                .is_some_and(|c| c.id == category.id);
            next.selected_category = if already_selected { None } else { Some(category) };
        }
        Action::Increment(product) => {
            next.cart
                .entry(product.id)
                .and_modify(|item| item.count += 1)
                .or_insert(CartItem { product, count: 1 });
        }
        Action::Decrement(product_id) => {
            if let Some(item) = next.cart.get_mut(&product_id) {
                if item.count <= 1 {
                    next.cart.remove(&product_id);
                } else {
                    item.count -= 1;
                }
            }
        }
        Action::SetComment(comment) => next.comment = Some(comment),
        Action::SetPaymentMethod(method) => next.payment_method = method,
        Action::SetShippingField(field, value) => {
            next.shipping_info = next.shipping_info.with_field(field, value);
        }
        Action::SetShippingAddressField(field, value) => {
            next.shipping_info = next.shipping_info.with_address_field(field, value);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_owned(),
            description: String::new(),
            short_description: String::new(),
            price: "2.00".to_owned(),
            images: Vec::new(),
        }
    }

    fn category(id: i64) -> Category {
        Category {
            id,
            name: format!("cat-{id}"),
            count: 3,
        }
    }

    #[test]
    fn cart_quantity_follows_increments_and_decrements() {
        let tea = product(1, "Tea");
        let mut state = SessionState::new(None);
        state = reduce(state, Action::Increment(tea.clone()));
        state = reduce(state, Action::Increment(tea.clone()));
        state = reduce(state, Action::Increment(tea));
        assert_eq!(state.quantity(1), 3);

        state = reduce(state, Action::Decrement(1));
        state = reduce(state, Action::Decrement(1));
        assert_eq!(state.quantity(1), 1);

        // Dropping below one removes the entry entirely.
        state = reduce(state, Action::Decrement(1));
        assert_eq!(state.quantity(1), 0);
        assert!(!state.cart.contains_key(&1));

        // Decrementing an absent product is a no-op, never a negative count.
        state = reduce(state, Action::Decrement(1));
        assert!(state.cart.is_empty());
    }

    #[test]
    fn selecting_selected_category_clears_it_and_resets_paging() {
        let mut state = SessionState::new(None);
        state = reduce(state, Action::SelectCategory(category(5)));
        assert_eq!(state.selected_category.as_ref().map(|c| c.id), Some(5));

        state = reduce(
            state,
            Action::ReplaceCatalogPage {
                products: vec![product(1, "Tea")],
                has_more: false,
                page: 1,
                category_id: Some(5),
            },
        );
        assert_eq!(state.page, 1);

        state = reduce(state, Action::SelectCategory(category(5)));
        assert_eq!(state.selected_category, None);
        assert_eq!(state.page, 0);
        assert!(state.has_more);
        assert!(state.products.is_empty());
    }

    #[test]
    fn stale_catalog_page_is_discarded() {
        let mut state = SessionState::new(None);
        state = reduce(state, Action::SelectCategory(category(5)));

        // Response for the previously selected (now cleared) category.
        let stale = reduce(
            state.clone(),
            Action::ReplaceCatalogPage {
                products: vec![product(9, "Stale")],
                has_more: true,
                page: 1,
                category_id: None,
            },
        );
        assert_eq!(stale, state);

        // Response skipping ahead of the committed page.
        let skipped = reduce(
            state.clone(),
            Action::ReplaceCatalogPage {
                products: vec![product(9, "Skipped")],
                has_more: true,
                page: 2,
                category_id: Some(5),
            },
        );
        assert_eq!(skipped, state);

        // The matching response is applied.
        let applied = reduce(
            state,
            Action::ReplaceCatalogPage {
                products: vec![product(1, "Tea")],
                has_more: true,
                page: 1,
                category_id: Some(5),
            },
        );
        assert_eq!(applied.page, 1);
        assert_eq!(applied.products.len(), 1);
        assert!(!applied.loading);
    }

    #[test]
    fn catalog_pages_accumulate_in_order() {
        let mut state = SessionState::new(None);
        state = reduce(
            state,
            Action::ReplaceCatalogPage {
                products: vec![product(1, "Tea"), product(2, "Coffee")],
                has_more: true,
                page: 1,
                category_id: None,
            },
        );
        state = reduce(
            state,
            Action::ReplaceCatalogPage {
                products: vec![product(3, "Cocoa")],
                has_more: false,
                page: 2,
                category_id: None,
            },
        );
        assert_eq!(state.products.len(), 3);
        assert_eq!(state.page, 2);
        assert!(!state.has_more);
    }

    #[test]
    fn view_item_keeps_a_snapshot() {
        let mut state = SessionState::new(None);
        state = reduce(state, Action::ViewItem(product(4, "Mint")));
        assert_eq!(state.mode, Mode::Item);

        // Replacing the catalog does not disturb the viewed snapshot.
        state = reduce(state, Action::SelectCategory(category(2)));
        assert_eq!(
            state.selected_product.as_ref().map(|p| p.name.as_str()),
            Some("Mint")
        );
    }

    #[test]
    fn shipping_edits_merge_into_existing_info() {
        let mut state = SessionState::new(Some("ada"));
        state = reduce(
            state,
            Action::SetShippingAddressField(AddressField::StreetLine1, "1 Main St".into()),
        );
        state = reduce(
            state,
            Action::SetShippingField(ShippingField::Phone, "555-0100".into()),
        );
        assert_eq!(state.shipping_info.name, "ada");
        assert_eq!(state.shipping_info.address.street_line1, "1 Main St");
        assert_eq!(state.shipping_info.phone.as_deref(), Some("555-0100"));
        assert_eq!(state.shipping_info.address.country_code, "US");
    }
}
