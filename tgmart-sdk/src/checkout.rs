//! Checkout initiator.
//!
//! Drives a session's cart through order submission and, for gateway
//! payments, the invoice flow. The host environment (the Telegram WebApp
//! shell in production) is reached through the [`WebAppRuntime`] trait so
//! the whole flow runs against test doubles.

use async_trait::async_trait;

use crate::client::ClientError;
use crate::objects::{
    MissingField, OrderRequest, OrderRequestItem, OrderResponse, PaymentMethod,
};
use crate::state::SessionState;

/// Terminal status reported by the gateway after the invoice sheet closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Failed,
    Cancelled,
    Pending,
}

/// Haptic feedback categories the host can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Error,
    Warning,
}

/// Submits an order request; implemented by [`crate::StorefrontClient`].
#[async_trait]
pub trait PlaceOrder: Send + Sync {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderResponse, ClientError>;
}

/// The host environment the checkout flow drives.
///
/// Replaces the global web-app handle with an explicit service object so
/// handlers can be exercised without a real Telegram client.
#[async_trait]
pub trait WebAppRuntime: Send + Sync {
    /// Whether the host is recent enough to open gateway invoices.
    fn supports_invoices(&self) -> bool;
    fn show_progress(&self);
    fn hide_progress(&self);
    async fn show_alert(&self, message: &str);
    /// Open the invoice sheet and wait for its terminal status.
    async fn open_invoice(&self, link: &str) -> InvoiceStatus;
    fn haptic_notification(&self, kind: HapticKind);
    fn close(&self);
}

/// Who is checking out, as reported by the host shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Option<i64>,
    pub chat_id: Option<i64>,
}

/// How a completed checkout ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash-on-delivery order accepted; the session is done.
    Confirmed { order_id: i64 },
    /// Gateway invoice was opened and reached a terminal status.
    InvoiceOpened {
        order_id: i64,
        status: InvoiceStatus,
    },
}

/// Errors surfaced by [`checkout`].
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A required shipping field is empty. Reported before any network
    /// call; the embedder renders it inline next to the form.
    #[error("missing shipping field: {0}")]
    Validation(#[from] MissingField),

    /// Submission failed in transit or the server rejected it. Local state
    /// is untouched so the user can retry.
    #[error("order submission failed: {0}")]
    Submit(#[from] ClientError),

    /// The host is too old for the invoice flow.
    #[error("invoice flow not supported by this client")]
    InvoiceUnsupported,
}

/// Validate, submit and settle one checkout attempt.
///
/// The session state is borrowed immutably: nothing here clears the cart or
/// edits shipping fields, so a failed attempt can simply be retried.
pub async fn checkout(
    state: &SessionState,
    user: UserContext,
    client: &impl PlaceOrder,
    runtime: &impl WebAppRuntime,
) -> Result<CheckoutOutcome, CheckoutError> {
    if state.payment_method == PaymentMethod::Cod {
        state.shipping_info.validate_for_delivery()?;
    }

    let request = build_request(state, user);

    runtime.show_progress();
    let response = match client.place_order(&request).await {
        Ok(response) => response,
        Err(e) => {
            runtime.hide_progress();
            runtime
                .show_alert("An error occurred while processing your order!")
                .await;
            return Err(e.into());
        }
    };

    match response.payment_method {
        PaymentMethod::Cod => {
            runtime.hide_progress();
            runtime
                .show_alert(&cod_confirmation(response.order_id, state))
                .await;
            runtime.close();
            Ok(CheckoutOutcome::Confirmed {
                order_id: response.order_id,
            })
        }
        PaymentMethod::Telegram => {
            if !runtime.supports_invoices() {
                runtime.hide_progress();
                runtime
                    .show_alert(
                        "Telegram payment requires app version 6.1 or higher. \
                         Please update your Telegram app!",
                    )
                    .await;
                return Err(CheckoutError::InvoiceUnsupported);
            }
            let link = response.invoice_link.as_deref().unwrap_or_default();
            let status = runtime.open_invoice(link).await;
            runtime.hide_progress();
            match status {
                InvoiceStatus::Paid => runtime.close(),
                InvoiceStatus::Failed => {
                    runtime.haptic_notification(HapticKind::Error);
                    runtime
                        .show_alert("Payment failed. Please try again!")
                        .await;
                }
                // The invoice stays usable; signal quietly and let the
                // user retry within the same sheet.
                InvoiceStatus::Cancelled | InvoiceStatus::Pending => {
                    runtime.haptic_notification(HapticKind::Warning);
                }
            }
            Ok(CheckoutOutcome::InvoiceOpened {
                order_id: response.order_id,
                status,
            })
        }
    }
}

fn build_request(state: &SessionState, user: UserContext) -> OrderRequest {
    let items = state
        .cart
        .values()
        .map(|item| OrderRequestItem {
            id: item.product.id,
            count: item.count,
        })
        .collect();
    OrderRequest {
        items,
        payment_method: state.payment_method,
        comment: state.comment.clone(),
        shipping_zone: state.shipping_zone,
        shipping_info: (state.payment_method == PaymentMethod::Cod)
            .then(|| state.shipping_info.clone()),
        user_id: user.user_id,
        chat_id: user.chat_id,
    }
}

fn cod_confirmation(order_id: i64, state: &SessionState) -> String {
    let address = &state.shipping_info.address;
    format!(
        "Order #{order_id} has been placed successfully! You will pay on delivery.\n\
         Ship to: {}, {}, {} {}",
        state.shipping_info.name, address.street_line1, address.city, address.post_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{OrderStatus, Product};
    use crate::state::{Action, Mode, reduce};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubSubmitter {
        response: Mutex<Option<Result<OrderResponse, ClientError>>>,
        requests: Mutex<Vec<OrderRequest>>,
    }

    impl StubSubmitter {
        fn responding(response: OrderResponse) -> Self {
            Self {
                response: Mutex::new(Some(Ok(response))),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Mutex::new(Some(Err(ClientError::Api {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".into(),
                }))),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl PlaceOrder for StubSubmitter {
        async fn place_order(&self, request: &OrderRequest) -> Result<OrderResponse, ClientError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            match self.response.lock().ok().and_then(|mut r| r.take()) {
                Some(result) => result,
                None => Err(ClientError::Api {
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                    body: "stub exhausted".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct StubRuntime {
        invoices_supported: bool,
        invoice_status: Option<InvoiceStatus>,
        alerts: Mutex<Vec<String>>,
        haptics: Mutex<Vec<HapticKind>>,
        opened_links: Mutex<Vec<String>>,
        closed: AtomicBool,
    }

    impl StubRuntime {
        fn alerts(&self) -> Vec<String> {
            self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
        }

        fn haptics(&self) -> Vec<HapticKind> {
            self.haptics.lock().map(|h| h.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl WebAppRuntime for StubRuntime {
        fn supports_invoices(&self) -> bool {
            self.invoices_supported
        }
        fn show_progress(&self) {}
        fn hide_progress(&self) {}
        async fn show_alert(&self, message: &str) {
            if let Ok(mut alerts) = self.alerts.lock() {
                alerts.push(message.to_owned());
            }
        }
        async fn open_invoice(&self, link: &str) -> InvoiceStatus {
            if let Ok(mut opened) = self.opened_links.lock() {
                opened.push(link.to_owned());
            }
            self.invoice_status.unwrap_or(InvoiceStatus::Pending)
        }
        fn haptic_notification(&self, kind: HapticKind) {
            if let Ok(mut haptics) = self.haptics.lock() {
                haptics.push(kind);
            }
        }
        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

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

    fn cod_ready_state() -> SessionState {
        let mut state = SessionState::new(Some("Ada"));
        state = reduce(state, Action::Increment(product(1, "Tea")));
        state = reduce(state, Action::Increment(product(1, "Tea")));
        state = reduce(state, Action::Increment(product(2, "Coffee")));
        state = reduce(state, Action::SetMode(Mode::Order));
        state.shipping_info.phone = Some("555-0100".into());
        state.shipping_info.address.street_line1 = "1 Main St".into();
        state.shipping_info.address.city = "Hanoi".into();
        state.shipping_info.address.post_code = "10000".into();
        state
    }

    fn response(method: PaymentMethod, invoice_link: Option<&str>) -> OrderResponse {
        OrderResponse {
            order_id: 17,
            status: OrderStatus::Pending,
            payment_method: method,
            invoice_link: invoice_link.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn cod_with_empty_street_fails_before_any_network_call() {
        let mut state = cod_ready_state();
        state.shipping_info.address.street_line1.clear();
        let submitter = StubSubmitter::responding(response(PaymentMethod::Cod, None));
        let runtime = StubRuntime::default();

        let result = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(MissingField::StreetLine1))
        ));
        assert_eq!(submitter.request_count(), 0);
    }

    #[tokio::test]
    async fn cod_checkout_confirms_and_closes() {
        let state = cod_ready_state();
        let submitter = StubSubmitter::responding(response(PaymentMethod::Cod, None));
        let runtime = StubRuntime::default();
        let user = UserContext {
            user_id: Some(42),
            chat_id: Some(99),
        };

        let outcome = checkout(&state, user, &submitter, &runtime).await;

        assert!(matches!(
            outcome,
            Ok(CheckoutOutcome::Confirmed { order_id: 17 })
        ));
        assert!(runtime.closed.load(Ordering::SeqCst));
        let alerts = runtime.alerts();
        assert!(alerts[0].contains("Order #17"));
        assert!(alerts[0].contains("1 Main St"));

        let requests = submitter.requests.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0], OrderRequestItem { id: 1, count: 2 });
        assert_eq!(request.user_id, Some(42));
        assert!(request.shipping_info.is_some());
    }

    #[tokio::test]
    async fn gateway_checkout_omits_shipping_info() {
        let mut state = cod_ready_state();
        state = reduce(state, Action::SetPaymentMethod(PaymentMethod::Telegram));
        let submitter =
            StubSubmitter::responding(response(PaymentMethod::Telegram, Some("https://t.me/i/1")));
        let runtime = StubRuntime {
            invoices_supported: true,
            invoice_status: Some(InvoiceStatus::Paid),
            ..StubRuntime::default()
        };

        let outcome = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(
            outcome,
            Ok(CheckoutOutcome::InvoiceOpened {
                order_id: 17,
                status: InvoiceStatus::Paid,
            })
        ));
        let requests = submitter.requests.lock().map(|r| r.clone()).unwrap_or_default();
        assert!(requests[0].shipping_info.is_none());
        assert!(runtime.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn outdated_client_cannot_open_invoices() {
        let mut state = cod_ready_state();
        state = reduce(state, Action::SetPaymentMethod(PaymentMethod::Telegram));
        let submitter =
            StubSubmitter::responding(response(PaymentMethod::Telegram, Some("https://t.me/i/1")));
        let runtime = StubRuntime::default();

        let result = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(result, Err(CheckoutError::InvoiceUnsupported)));
        assert!(runtime.alerts()[0].contains("6.1"));
        assert!(runtime
            .opened_links
            .lock()
            .map(|o| o.is_empty())
            .unwrap_or(false));
    }

    #[tokio::test]
    async fn failed_invoice_alerts_with_error_haptic() {
        let mut state = cod_ready_state();
        state = reduce(state, Action::SetPaymentMethod(PaymentMethod::Telegram));
        let submitter =
            StubSubmitter::responding(response(PaymentMethod::Telegram, Some("https://t.me/i/1")));
        let runtime = StubRuntime {
            invoices_supported: true,
            invoice_status: Some(InvoiceStatus::Failed),
            ..StubRuntime::default()
        };

        let outcome = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(
            outcome,
            Ok(CheckoutOutcome::InvoiceOpened {
                status: InvoiceStatus::Failed,
                ..
            })
        ));
        assert_eq!(runtime.haptics(), vec![HapticKind::Error]);
        assert!(!runtime.alerts().is_empty());
        assert!(!runtime.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancelled_invoice_warns_without_message() {
        let mut state = cod_ready_state();
        state = reduce(state, Action::SetPaymentMethod(PaymentMethod::Telegram));
        let submitter =
            StubSubmitter::responding(response(PaymentMethod::Telegram, Some("https://t.me/i/1")));
        let runtime = StubRuntime {
            invoices_supported: true,
            invoice_status: Some(InvoiceStatus::Cancelled),
            ..StubRuntime::default()
        };

        let outcome = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(outcome, Ok(CheckoutOutcome::InvoiceOpened { .. })));
        assert_eq!(runtime.haptics(), vec![HapticKind::Warning]);
        assert!(runtime.alerts().is_empty());
    }

    #[tokio::test]
    async fn submission_failure_shows_generic_alert() {
        let state = cod_ready_state();
        let submitter = StubSubmitter::failing();
        let runtime = StubRuntime::default();

        let result = checkout(&state, UserContext::default(), &submitter, &runtime).await;

        assert!(matches!(result, Err(CheckoutError::Submit(_))));
        assert!(runtime.alerts()[0].contains("processing your order"));
        assert!(!runtime.closed.load(Ordering::SeqCst));
    }
}
