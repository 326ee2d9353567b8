use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    application::{
        interfaces::provider::ProviderClient,
        usecases::{
            admission::AdmissionUseCase, rejection::RejectionUseCase,
            song_status::SongStatusUseCase, token_manager::TokenManager,
        },
    },
    domain::{
        repositories::{
            credentials::CredentialRepository, play_history::PlayHistoryRepository,
            queue::QueueRepository, rejections::RejectionRepository, venues::VenueRepository,
        },
        value_objects::queue::{
            AckResponse, AdmitSongRequest, RejectSongRequest, UpdateSongStatusRequest,
        },
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                credentials::CredentialPostgres, play_history::PlayHistoryPostgres,
                queue::QueuePostgres, rejections::RejectionPostgres, venues::VenuePostgres,
            },
        },
        spotify::client::SpotifyClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, spotify_client: Arc<SpotifyClient>) -> Router {
    let venue_repository = Arc::new(VenuePostgres::new(Arc::clone(&db_pool)));
    let queue_repository = Arc::new(QueuePostgres::new(Arc::clone(&db_pool)));
    let credential_repository = Arc::new(CredentialPostgres::new(Arc::clone(&db_pool)));
    let play_history_repository = Arc::new(PlayHistoryPostgres::new(Arc::clone(&db_pool)));
    let rejection_repository = Arc::new(RejectionPostgres::new(Arc::clone(&db_pool)));

    let token_manager = Arc::new(TokenManager::new(
        Arc::clone(&credential_repository),
        Arc::clone(&spotify_client),
    ));

    let admission_usecase = AdmissionUseCase::new(
        venue_repository,
        Arc::clone(&queue_repository),
        Arc::clone(&token_manager),
        spotify_client,
    );
    let rejection_usecase = RejectionUseCase::new(
        Arc::clone(&queue_repository),
        rejection_repository,
        token_manager,
    );
    let song_status_usecase = SongStatusUseCase::new(queue_repository, play_history_repository);

    Router::new()
        .route("/api/v1/queue/request", post(admit))
        .with_state(Arc::new(admission_usecase))
        .merge(
            Router::new()
                .route("/api/v1/queue/reject", post(reject))
                .with_state(Arc::new(rejection_usecase)),
        )
        .merge(
            Router::new()
                .route("/api/v1/queue/status", post(update_status))
                .with_state(Arc::new(song_status_usecase)),
        )
}

pub async fn admit<V, Q, C, P>(
    State(admission_usecase): State<Arc<AdmissionUseCase<V, Q, C, P>>>,
    Json(admit_song_request): Json<AdmitSongRequest>,
) -> Result<Json<AckResponse>, AppError>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    let response = admission_usecase.admit(admit_song_request).await?;
    Ok(Json(response))
}

pub async fn reject<Q, R, C, P>(
    State(rejection_usecase): State<Arc<RejectionUseCase<Q, R, C, P>>>,
    Json(reject_song_request): Json<RejectSongRequest>,
) -> Result<Json<AckResponse>, AppError>
where
    Q: QueueRepository + Send + Sync + 'static,
    R: RejectionRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    let response = rejection_usecase.reject(reject_song_request).await?;
    Ok(Json(response))
}

pub async fn update_status<Q, H>(
    State(song_status_usecase): State<Arc<SongStatusUseCase<Q, H>>>,
    Json(update_status_request): Json<UpdateSongStatusRequest>,
) -> Result<Json<AckResponse>, AppError>
where
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    let response = song_status_usecase
        .update_status(update_status_request)
        .await?;
    Ok(Json(response))
}
