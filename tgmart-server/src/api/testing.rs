//! Recording test doubles for the backend and gateway seams.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tgmart_core::backend::{
    BackendError, CommerceBackend, NewLineItem, Order, OrderLineItem, ShippingMethod,
};
use tgmart_core::gateway::types::{InvoiceParams, OutgoingMessage};
use tgmart_core::gateway::{
    GatewayError, PaymentGateway, PreCheckoutAnswer, ShippingQueryAnswer,
};
use tgmart_sdk::objects::{PaymentMethod, ShippingInfo};
use url::Url;

use crate::state::AppState;

/// Build an [`AppState`] around test doubles.
pub(crate) fn state_with(
    backend: Arc<dyn CommerceBackend>,
    gateway: Arc<dyn PaymentGateway>,
) -> AppState {
    AppState::new(
        backend,
        gateway,
        "test-secret",
        Url::parse("https://store-app.example.com/").unwrap(),
    )
}

fn backend_failure() -> BackendError {
    BackendError::Api {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "backend exploded".into(),
    }
}

/// Commerce backend double that records every call.
pub(crate) struct RecordingBackend {
    pub currency: String,
    pub line_items: Vec<OrderLineItem>,
    pub methods: Vec<ShippingMethod>,
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_set_paid: bool,
    pub created: Mutex<Vec<(Vec<NewLineItem>, String, PaymentMethod)>>,
    pub updates: Mutex<Vec<(i64, ShippingInfo)>>,
    pub paid: Mutex<Vec<i64>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            line_items: Vec::new(),
            methods: Vec::new(),
            fail_create: false,
            fail_update: false,
            fail_set_paid: false,
            created: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            paid: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommerceBackend for RecordingBackend {
    async fn create_order(
        &self,
        items: &[NewLineItem],
        customer_note: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order, BackendError> {
        if self.fail_create {
            return Err(backend_failure());
        }
        self.created
            .lock()
            .unwrap()
            .push((items.to_vec(), customer_note.to_owned(), payment_method));
        Ok(Order {
            id: 101,
            order_key: "wc_order_abc".into(),
            currency: self.currency.clone(),
            payment_method: payment_method.to_string(),
            line_items: self.line_items.clone(),
        })
    }

    async fn update_order_info(
        &self,
        order_id: i64,
        info: &ShippingInfo,
    ) -> Result<(), BackendError> {
        if self.fail_update {
            return Err(backend_failure());
        }
        self.updates.lock().unwrap().push((order_id, info.clone()));
        Ok(())
    }

    async fn set_order_paid(&self, order_id: i64) -> Result<(), BackendError> {
        if self.fail_set_paid {
            return Err(backend_failure());
        }
        self.paid.lock().unwrap().push(order_id);
        Ok(())
    }

    async fn shipping_methods(&self, _zone_id: i64) -> Result<Vec<ShippingMethod>, BackendError> {
        Ok(self.methods.clone())
    }
}

/// Payment gateway double that records every call.
pub(crate) struct RecordingGateway {
    pub invoice_link: String,
    pub invoices: Mutex<Vec<InvoiceParams>>,
    pub shipping_answers: Mutex<Vec<(String, ShippingQueryAnswer)>>,
    pub pre_checkout_answers: Mutex<Vec<(String, PreCheckoutAnswer)>>,
    pub messages: Mutex<Vec<OutgoingMessage>>,
    pub menu_buttons: Mutex<Vec<(i64, String)>>,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            invoice_link: "https://t.me/invoice/abc".into(),
            invoices: Mutex::new(Vec::new()),
            shipping_answers: Mutex::new(Vec::new()),
            pre_checkout_answers: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            menu_buttons: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_invoice_link(&self, invoice: &InvoiceParams) -> Result<String, GatewayError> {
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(self.invoice_link.clone())
    }

    async fn answer_shipping_query(
        &self,
        query_id: &str,
        answer: ShippingQueryAnswer,
    ) -> Result<(), GatewayError> {
        self.shipping_answers
            .lock()
            .unwrap()
            .push((query_id.to_owned(), answer));
        Ok(())
    }

    async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        answer: PreCheckoutAnswer,
    ) -> Result<(), GatewayError> {
        self.pre_checkout_answers
            .lock()
            .unwrap()
            .push((query_id.to_owned(), answer));
        Ok(())
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn set_chat_menu_button(
        &self,
        chat_id: i64,
        text: &str,
        _web_app_url: &Url,
    ) -> Result<(), GatewayError> {
        self.menu_buttons
            .lock()
            .unwrap()
            .push((chat_id, text.to_owned()));
        Ok(())
    }

    async fn set_webhook(&self, _url: &Url, _secret_token: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}
