use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    application::interfaces::provider::ProviderClient,
    domain::{
        repositories::credentials::CredentialRepository,
        value_objects::{
            provider::{FoundTrack, TrackListing},
            search::{PlaylistTracksRequest, TrackDto, TrackSearchRequest, TrackSearchResponse},
        },
    },
    infrastructure::axum_http::error_responses::AppError,
};

/// Kiosk-facing catalog lookups. Runs on a client-credentials grant (no user
/// token involved) and always drops explicit tracks from results.
pub struct TrackSearchUseCase<C, P>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    credential_repository: Arc<C>,
    provider_client: Arc<P>,
}

impl<C, P> TrackSearchUseCase<C, P>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    pub fn new(credential_repository: Arc<C>, provider_client: Arc<P>) -> Self {
        Self {
            credential_repository,
            provider_client,
        }
    }

    pub async fn search(
        &self,
        request: TrackSearchRequest,
    ) -> Result<TrackSearchResponse, AppError> {
        let credential = self
            .credential_repository
            .find_by_venue_id(request.venue_id)
            .await?
            .ok_or(AppError::ProviderNotConnected)?;

        let client_id = credential
            .client_id
            .clone()
            .ok_or(AppError::CredentialsNotConfigured)?;
        let client_secret = credential
            .client_secret
            .clone()
            .ok_or(AppError::CredentialsNotConfigured)?;

        let grant = self
            .provider_client
            .client_credentials_token(&client_id, &client_secret)
            .await
            .map_err(|err| {
                error!(venue_id = %request.venue_id, error = %err, "client credentials grant failed");
                AppError::SearchFailed
            })?;

        let tracks = if credential.restrict_to_playlist {
            // Restriction without a playlist id is a config error, not an
            // implicit fall-through to a catalog-wide search.
            let playlist_id = credential
                .playlist_id
                .clone()
                .ok_or(AppError::PlaylistNotConfigured)?;

            let listing = self
                .provider_client
                .playlist_tracks(&grant.access_token, &playlist_id)
                .await?;
            let tracks = match listing {
                TrackListing::Tracks(tracks) => tracks,
                _ => return Err(AppError::SearchFailed),
            };

            let query = request.query.to_lowercase();
            tracks
                .into_iter()
                .filter(|track| matches_query(track, &query))
                .collect()
        } else {
            match self
                .provider_client
                .search_tracks(&grant.access_token, &request.query)
                .await?
            {
                TrackListing::Tracks(tracks) => tracks,
                _ => return Err(AppError::SearchFailed),
            }
        };

        debug!(
            venue_id = %request.venue_id,
            results = tracks.len(),
            restricted = credential.restrict_to_playlist,
            "track search completed"
        );

        Ok(non_explicit_response(tracks))
    }

    pub async fn playlist_tracks(
        &self,
        request: PlaylistTracksRequest,
    ) -> Result<TrackSearchResponse, AppError> {
        let credential = self
            .credential_repository
            .find_by_venue_id(request.venue_id)
            .await?
            .ok_or(AppError::ProviderNotConnected)?;

        if !credential.restrict_to_playlist {
            return Err(AppError::PlaylistNotConfigured);
        }
        let playlist_id = credential
            .playlist_id
            .clone()
            .ok_or(AppError::PlaylistNotConfigured)?;

        let client_id = credential
            .client_id
            .ok_or(AppError::CredentialsNotConfigured)?;
        let client_secret = credential
            .client_secret
            .ok_or(AppError::CredentialsNotConfigured)?;

        let grant = self
            .provider_client
            .client_credentials_token(&client_id, &client_secret)
            .await
            .map_err(|err| {
                error!(venue_id = %request.venue_id, error = %err, "client credentials grant failed");
                AppError::SearchFailed
            })?;

        match self
            .provider_client
            .playlist_tracks(&grant.access_token, &playlist_id)
            .await?
        {
            TrackListing::Tracks(tracks) => Ok(non_explicit_response(tracks)),
            _ => Err(AppError::SearchFailed),
        }
    }
}

fn matches_query(track: &FoundTrack, query: &str) -> bool {
    track.name.to_lowercase().contains(query)
        || track
            .artists
            .iter()
            .any(|artist| artist.to_lowercase().contains(query))
        || track
            .album
            .as_deref()
            .is_some_and(|album| album.to_lowercase().contains(query))
}

fn non_explicit_response(tracks: Vec<FoundTrack>) -> TrackSearchResponse {
    TrackSearchResponse {
        tracks: tracks
            .into_iter()
            .filter(|track| !track.explicit)
            .map(TrackDto::from)
            .collect(),
    }
}
