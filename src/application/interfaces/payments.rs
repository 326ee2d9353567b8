use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub product_name: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionState {
    pub id: String,
    pub paid: bool,
    pub amount_total_minor: Option<i64>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Seam to the payment processor's hosted-checkout API.
#[async_trait]
#[automock]
pub trait PaymentGateway {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSessionState>;
}
