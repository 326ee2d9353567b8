use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Application-level failure taxonomy. Configuration and policy errors are
/// terminal; transient provider errors get exactly one remediation attempt
/// before they land here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Venue not found")]
    VenueNotFound,

    #[error("Venue has not connected Spotify")]
    ProviderNotConnected,

    #[error("Spotify client credentials not configured")]
    CredentialsNotConfigured,

    #[error("Invalid token format")]
    MalformedCredential,

    #[error("Token refresh failed")]
    TokenRefreshFailed,

    #[error("Failed to exchange authorization code")]
    TokenExchangeFailed,

    #[error("Spotify authorization failed")]
    ProviderAuthFailed,

    #[error("Song requests are disabled at this venue")]
    QueueingDisabled,

    #[error("Payment required for song requests at this venue")]
    PaymentRequired,

    #[error("Explicit content is not allowed at this venue")]
    ContentRejected,

    #[error("No active Spotify device found for venue")]
    NoActiveDevice,

    #[error("Spotify Premium required for venue account")]
    PremiumRequired,

    #[error("Failed to queue song: {0}")]
    ProviderQueueFailed(String),

    #[error("Spotify search failed")]
    SearchFailed,

    #[error("Venue does not require payment for song requests")]
    PricingNotEnabled,

    #[error("Payment not completed")]
    PaymentNotCompleted,

    #[error("Invalid payment session metadata")]
    InvalidPaymentMetadata,

    #[error("Queue item not found")]
    EntryNotFound,

    #[error("Venue does not restrict requests to a playlist")]
    PlaylistNotConfigured,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::VenueNotFound
            | AppError::ProviderNotConnected
            | AppError::NoActiveDevice
            | AppError::EntryNotFound => StatusCode::NOT_FOUND,

            AppError::CredentialsNotConfigured
            | AppError::MalformedCredential
            | AppError::QueueingDisabled
            | AppError::ContentRejected
            | AppError::PricingNotEnabled
            | AppError::PaymentNotCompleted
            | AppError::InvalidPaymentMetadata
            | AppError::PlaylistNotConfigured => StatusCode::BAD_REQUEST,

            AppError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            AppError::PremiumRequired => StatusCode::FORBIDDEN,

            AppError::TokenRefreshFailed | AppError::ProviderAuthFailed => {
                StatusCode::UNAUTHORIZED
            }

            AppError::ProviderQueueFailed(_)
            | AppError::TokenExchangeFailed
            | AppError::SearchFailed => StatusCode::BAD_GATEWAY,

            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Don't leak internal error detail to client
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
