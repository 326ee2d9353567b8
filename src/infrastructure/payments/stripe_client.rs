use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;

use crate::application::interfaces::payments::{
    CheckoutRequest, CheckoutSession, CheckoutSessionState, PaymentGateway,
};

/// Minimal Stripe client built on reqwest. Sessions are one-off payments
/// with an inline `price_data` line item; no prices or products are
/// provisioned in the Stripe account.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    amount_total: Option<i64>,
    currency: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

impl StripeClient {
    pub fn new(secret_key: String, success_url: String, cancel_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build Stripe HTTP client");

        Self {
            http,
            secret_key,
            success_url,
            cancel_url,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (stripe_error_type, stripe_error_code, stripe_error_message) =
            match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => (
                    envelope.error.type_,
                    envelope.error.code,
                    envelope.error.message,
                ),
                Err(_) => (None, None, None),
            };

        error!(
            status = %status,
            stripe_error_type = ?stripe_error_type,
            stripe_error_code = ?stripe_error_code,
            stripe_error_message = ?stripe_error_message,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!("Stripe API request failed: {} (status {})", context, status);
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    /// Creates a Checkout Session and returns its id and redirect URL.
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        // Stripe Checkout docs:
        // https://stripe.com/docs/payments/checkout
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency,
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name,
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                request.description,
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (key, value) in request.metadata {
            body.push((format!("metadata[{}]", key), value));
        }

        let resp = self
            .http
            .post("https://api.stripe.com/v1/checkout/sessions")
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        let parsed: StripeCheckoutSessionResponse = resp.json().await?;
        let url = parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))?;

        Ok(CheckoutSession { id: parsed.id, url })
    }

    /// Retrieves a session to verify its payment status after the redirect.
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSessionState> {
        // https://stripe.com/docs/api/checkout/sessions/retrieve
        let resp = self
            .http
            .get(format!(
                "https://api.stripe.com/v1/checkout/sessions/{}",
                session_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve checkout session").await?;

        let parsed: StripeCheckoutSessionResponse = resp.json().await?;

        Ok(CheckoutSessionState {
            id: parsed.id,
            paid: parsed.payment_status.as_deref() == Some("paid"),
            amount_total_minor: parsed.amount_total,
            currency: parsed.currency,
            metadata: parsed.metadata,
        })
    }
}
