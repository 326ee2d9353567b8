use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub venue_id: Uuid,
    pub track_id: String,
    pub track_name: String,
    pub artist_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub url: String,
    pub session_id: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: String,
    pub amount: f64,
    pub currency: String,
}
