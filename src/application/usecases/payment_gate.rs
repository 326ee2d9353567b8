use std::{collections::HashMap, sync::Arc};

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::{
        interfaces::{
            payments::{CheckoutRequest, PaymentGateway},
            provider::ProviderClient,
        },
        usecases::admission::AdmissionUseCase,
    },
    domain::{
        entities::venue_revenue::InsertRevenueEntryEntity,
        repositories::{
            credentials::CredentialRepository, queue::QueueRepository,
            revenue::RevenueRepository, venues::VenueRepository,
        },
        value_objects::{
            payments::{
                ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentRequest,
                CreatePaymentResponse,
            },
            queue::AdmitSongRequest,
        },
    },
    infrastructure::axum_http::error_responses::AppError,
};

pub const DEFAULT_STATIC_PRICE_MINOR: i32 = 99;

/// Dynamic pricing adds this much per pending entry, capped at a multiple of
/// the venue's base price.
const DYNAMIC_STEP_MINOR: i64 = 25;
const DYNAMIC_CAP_MULTIPLIER: i64 = 3;

const REVENUE_SOURCE_SONG_REQUEST: &str = "song_request";

/// Creates hosted checkout sessions for priced requests and converts a
/// confirmed payment into an admission plus one revenue ledger row.
///
/// Confirmation is driven by the guest returning to the success URL; there is
/// no processor-pushed webhook, so a paid session that is never confirmed
/// leaves no queue entry and no ledger row.
pub struct PaymentGateUseCase<V, Q, C, P, G, R>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    R: RevenueRepository + Send + Sync + 'static,
{
    venue_repository: Arc<V>,
    queue_repository: Arc<Q>,
    revenue_repository: Arc<R>,
    payment_gateway: Arc<G>,
    admission_usecase: Arc<AdmissionUseCase<V, Q, C, P>>,
    currency: String,
}

impl<V, Q, C, P, G, R> PaymentGateUseCase<V, Q, C, P, G, R>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    R: RevenueRepository + Send + Sync + 'static,
{
    pub fn new(
        venue_repository: Arc<V>,
        queue_repository: Arc<Q>,
        revenue_repository: Arc<R>,
        payment_gateway: Arc<G>,
        admission_usecase: Arc<AdmissionUseCase<V, Q, C, P>>,
        currency: String,
    ) -> Self {
        Self {
            venue_repository,
            queue_repository,
            revenue_repository,
            payment_gateway,
            admission_usecase,
            currency,
        }
    }

    pub async fn create_session(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, AppError> {
        let venue = self
            .venue_repository
            .find_by_venue_id(request.venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        if !venue.enable_pricing {
            return Err(AppError::PricingNotEnabled);
        }

        let static_minor = i64::from(
            venue
                .static_price_minor
                .unwrap_or(DEFAULT_STATIC_PRICE_MINOR),
        );
        let amount_minor = if venue.dynamic_pricing {
            let pending = self
                .queue_repository
                .count_pending(request.venue_id)
                .await?;
            (static_minor + pending * DYNAMIC_STEP_MINOR)
                .min(static_minor * DYNAMIC_CAP_MULTIPLIER)
        } else {
            static_minor
        };

        let artist_name = request.artist_names.join(", ");
        let mut metadata = HashMap::new();
        metadata.insert("venueId".to_string(), request.venue_id.to_string());
        metadata.insert("trackId".to_string(), request.track_id.clone());
        metadata.insert("trackName".to_string(), request.track_name.clone());
        metadata.insert("artistNames".to_string(), artist_name.clone());

        let checkout = self
            .payment_gateway
            .create_checkout_session(CheckoutRequest {
                amount_minor,
                currency: self.currency.clone(),
                product_name: format!("Song request: {}", request.track_name),
                description: format!(
                    "Request \"{}\" by {} at {}",
                    request.track_name, artist_name, venue.venue_name
                ),
                metadata,
            })
            .await?;

        info!(
            venue_id = %request.venue_id,
            track_id = %request.track_id,
            amount_minor,
            session_id = %checkout.id,
            "checkout session created"
        );

        Ok(CreatePaymentResponse {
            url: checkout.url,
            session_id: checkout.id,
            price: amount_minor as f64 / 100.0,
            currency: self.currency.to_uppercase(),
        })
    }

    pub async fn confirm(
        &self,
        request: ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, AppError> {
        let state = self
            .payment_gateway
            .retrieve_session(&request.session_id)
            .await?;

        if !state.paid {
            return Err(AppError::PaymentNotCompleted);
        }

        let venue_id = state
            .metadata
            .get("venueId")
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(AppError::InvalidPaymentMetadata)?;
        let track_id = state
            .metadata
            .get("trackId")
            .cloned()
            .ok_or(AppError::InvalidPaymentMetadata)?;
        let track_name = state
            .metadata
            .get("trackName")
            .cloned()
            .ok_or(AppError::InvalidPaymentMetadata)?;
        let artist_name = state
            .metadata
            .get("artistNames")
            .cloned()
            .ok_or(AppError::InvalidPaymentMetadata)?;
        let artist_names: Vec<String> = artist_name.split(", ").map(str::to_string).collect();

        // Payment is proven, so the admission runs with the session attached
        // and clears the payment gate.
        self.admission_usecase
            .admit(AdmitSongRequest {
                venue_id,
                track_id,
                track_name: track_name.clone(),
                artist_names,
                requester_name: None,
                payment_session_id: Some(state.id.clone()),
            })
            .await?;

        let amount_minor = state.amount_total_minor.unwrap_or(0);
        let currency = state
            .currency
            .clone()
            .unwrap_or_else(|| self.currency.clone())
            .to_uppercase();

        let insert_revenue = InsertRevenueEntryEntity {
            venue_id,
            amount_minor: amount_minor as i32,
            currency: currency.clone(),
            source: REVENUE_SOURCE_SONG_REQUEST.to_string(),
            description: Some(format!("Payment for \"{}\" by {}", track_name, artist_name)),
        };
        if let Err(err) = self.revenue_repository.insert(insert_revenue).await {
            error!(
                %venue_id,
                session_id = %state.id,
                error = %err,
                "failed to record revenue entry"
            );
        }

        Ok(ConfirmPaymentResponse {
            success: true,
            message: format!(
                "\"{}\" by {} queued successfully after payment!",
                track_name, artist_name
            ),
            amount: amount_minor as f64 / 100.0,
            currency,
        })
    }
}
