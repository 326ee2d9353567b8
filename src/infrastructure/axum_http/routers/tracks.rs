use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    application::{interfaces::provider::ProviderClient, usecases::track_search::TrackSearchUseCase},
    domain::{
        repositories::credentials::CredentialRepository,
        value_objects::search::{PlaylistTracksRequest, TrackSearchRequest, TrackSearchResponse},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::credentials::CredentialPostgres,
        },
        spotify::client::SpotifyClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, spotify_client: Arc<SpotifyClient>) -> Router {
    let credential_repository = Arc::new(CredentialPostgres::new(Arc::clone(&db_pool)));
    let track_search_usecase = TrackSearchUseCase::new(credential_repository, spotify_client);

    Router::new()
        .route("/api/v1/tracks/search", post(search))
        .route("/api/v1/tracks/playlist", post(playlist_tracks))
        .with_state(Arc::new(track_search_usecase))
}

pub async fn search<C, P>(
    State(track_search_usecase): State<Arc<TrackSearchUseCase<C, P>>>,
    Json(track_search_request): Json<TrackSearchRequest>,
) -> Result<Json<TrackSearchResponse>, AppError>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    let response = track_search_usecase.search(track_search_request).await?;
    Ok(Json(response))
}

pub async fn playlist_tracks<C, P>(
    State(track_search_usecase): State<Arc<TrackSearchUseCase<C, P>>>,
    Json(playlist_tracks_request): Json<PlaylistTracksRequest>,
) -> Result<Json<TrackSearchResponse>, AppError>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    let response = track_search_usecase
        .playlist_tracks(playlist_tracks_request)
        .await?;
    Ok(Json(response))
}
