use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    application::{
        interfaces::{payments::PaymentGateway, provider::ProviderClient},
        usecases::{
            admission::AdmissionUseCase, payment_gate::PaymentGateUseCase,
            token_manager::TokenManager,
        },
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            credentials::CredentialRepository, queue::QueueRepository,
            revenue::RevenueRepository, venues::VenueRepository,
        },
        value_objects::payments::{
            ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentRequest,
            CreatePaymentResponse,
        },
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        payments::stripe_client::StripeClient,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                credentials::CredentialPostgres, queue::QueuePostgres,
                revenue::RevenuePostgres, venues::VenuePostgres,
            },
        },
        spotify::client::SpotifyClient,
    },
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    spotify_client: Arc<SpotifyClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let venue_repository = Arc::new(VenuePostgres::new(Arc::clone(&db_pool)));
    let queue_repository = Arc::new(QueuePostgres::new(Arc::clone(&db_pool)));
    let credential_repository = Arc::new(CredentialPostgres::new(Arc::clone(&db_pool)));
    let revenue_repository = Arc::new(RevenuePostgres::new(Arc::clone(&db_pool)));

    let token_manager = Arc::new(TokenManager::new(
        credential_repository,
        Arc::clone(&spotify_client),
    ));
    let admission_usecase = Arc::new(AdmissionUseCase::new(
        Arc::clone(&venue_repository),
        Arc::clone(&queue_repository),
        token_manager,
        spotify_client,
    ));

    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.success_url.clone(),
        config.stripe.cancel_url.clone(),
    ));

    let payment_gate_usecase = PaymentGateUseCase::new(
        venue_repository,
        queue_repository,
        revenue_repository,
        stripe_client,
        admission_usecase,
        config.stripe.currency.clone(),
    );

    Router::new()
        .route("/api/v1/payments/session", post(create_session))
        .route("/api/v1/payments/confirm", post(confirm))
        .with_state(Arc::new(payment_gate_usecase))
}

pub async fn create_session<V, Q, C, P, G, R>(
    State(payment_gate_usecase): State<Arc<PaymentGateUseCase<V, Q, C, P, G, R>>>,
    Json(create_payment_request): Json<CreatePaymentRequest>,
) -> Result<Json<CreatePaymentResponse>, AppError>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    R: RevenueRepository + Send + Sync + 'static,
{
    let response = payment_gate_usecase
        .create_session(create_payment_request)
        .await?;
    Ok(Json(response))
}

pub async fn confirm<V, Q, C, P, G, R>(
    State(payment_gate_usecase): State<Arc<PaymentGateUseCase<V, Q, C, P, G, R>>>,
    Json(confirm_payment_request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    R: RevenueRepository + Send + Sync + 'static,
{
    let response = payment_gate_usecase
        .confirm(confirm_payment_request)
        .await?;
    Ok(Json(response))
}
