use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    application::{
        interfaces::provider::ProviderClient,
        usecases::{playback_sync::PlaybackSyncUseCase, token_manager::TokenManager},
    },
    domain::{
        repositories::{
            credentials::CredentialRepository, play_history::PlayHistoryRepository,
            queue::QueueRepository,
        },
        value_objects::playback::{SyncPlaybackRequest, SyncReport},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                credentials::CredentialPostgres, play_history::PlayHistoryPostgres,
                queue::QueuePostgres,
            },
        },
        spotify::client::SpotifyClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, spotify_client: Arc<SpotifyClient>) -> Router {
    let credential_repository = Arc::new(CredentialPostgres::new(Arc::clone(&db_pool)));
    let queue_repository = Arc::new(QueuePostgres::new(Arc::clone(&db_pool)));
    let play_history_repository = Arc::new(PlayHistoryPostgres::new(Arc::clone(&db_pool)));

    let token_manager = Arc::new(TokenManager::new(
        credential_repository,
        Arc::clone(&spotify_client),
    ));
    let playback_sync_usecase = PlaybackSyncUseCase::new(
        token_manager,
        spotify_client,
        queue_repository,
        play_history_repository,
    );

    Router::new()
        .route("/api/v1/playback/sync", post(sync))
        .with_state(Arc::new(playback_sync_usecase))
}

pub async fn sync<C, P, Q, H>(
    State(playback_sync_usecase): State<Arc<PlaybackSyncUseCase<C, P, Q, H>>>,
    Json(sync_playback_request): Json<SyncPlaybackRequest>,
) -> Result<Json<SyncReport>, AppError>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    let report = playback_sync_usecase.sync(sync_playback_request).await?;
    Ok(Json(report))
}
