use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Access/refresh token pair after legacy-encoding normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Token endpoint response, for any grant type.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub venue_id: Uuid,
}

/// Written back to the credential store after a refresh or code exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenUpdateModel {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: DateTime<Utc>,
}
