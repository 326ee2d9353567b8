use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::error;

use crate::{
    application::interfaces::provider::ProviderClient,
    domain::value_objects::{
        provider::{
            CurrentlyPlaying, DeviceList, EnqueueOutcome, FoundTrack, PlaybackDevice,
            PlaybackSnapshot, TrackDetails, TrackListing, TrackLookup, TransferOutcome,
        },
        tokens::TokenGrant,
    },
};

/// Minimal Spotify Web API client built on reqwest. Base URLs come from
/// config so tests can point it at a stub server.
pub struct SpotifyClient {
    http: reqwest::Client,
    accounts_base_url: String,
    api_base_url: String,
}

/// Upper bound for any single provider call; a hung poll must not outlive
/// the next reconciliation cycle.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SpotifyErrorEnvelope {
    error: SpotifyErrorDetails,
}

#[derive(Debug, Deserialize)]
struct SpotifyErrorDetails {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
    duration_ms: Option<i64>,
    #[serde(default)]
    explicit: bool,
}

impl From<TrackItem> for FoundTrack {
    fn from(value: TrackItem) -> Self {
        Self {
            id: value.id,
            name: value.name,
            artists: value.artists.into_iter().map(|artist| artist.name).collect(),
            album: value.album.map(|album| album.name),
            duration_ms: value.duration_ms,
            explicit: value.explicit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingResponse {
    item: Option<TrackItem>,
    #[serde(default)]
    is_playing: bool,
}

#[derive(Debug, Deserialize)]
struct DeviceItem {
    id: Option<String>,
    name: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<DeviceItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistTrackItem {
    track: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksResponse {
    #[serde(default)]
    items: Vec<PlaylistTrackItem>,
}

impl SpotifyClient {
    pub fn new(accounts_base_url: String, api_base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build Spotify HTTP client");

        Self {
            http,
            accounts_base_url,
            api_base_url,
        }
    }

    async fn token_grant(
        &self,
        form: &[(&str, &str)],
        basic_auth: Option<(&str, &str)>,
        context: &str,
    ) -> Result<TokenGrant> {
        let mut request = self
            .http
            .post(format!("{}/api/token", self.accounts_base_url))
            .form(form);
        if let Some((client_id, client_secret)) = basic_auth {
            request = request.basic_auth(client_id, Some(client_secret));
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = %status,
                response_body = %body,
                context = %context,
                "spotify token request failed"
            );
            anyhow::bail!("Spotify token request failed: {} (status {})", context, status);
        }

        let parsed: TokenResponse = resp.json().await?;
        Ok(TokenGrant {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_in: parsed.expires_in,
        })
    }

    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        match resp.json::<SpotifyErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .message
                .unwrap_or_else(|| format!("provider returned status {status}")),
            Err(_) => format!("provider returned status {status}"),
        }
    }
}

#[async_trait]
impl ProviderClient for SpotifyClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant> {
        self.token_grant(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ],
            Some((client_id, client_secret)),
            "authorization code exchange",
        )
        .await
    }

    async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenGrant> {
        self.token_grant(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Some((client_id, client_secret)),
            "token refresh",
        )
        .await
    }

    async fn client_credentials_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenGrant> {
        self.token_grant(
            &[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
            None,
            "client credentials grant",
        )
        .await
    }

    async fn track_details(&self, access_token: &str, track_id: &str) -> Result<TrackLookup> {
        let resp = self
            .http
            .get(format!("{}/v1/tracks/{}", self.api_base_url, track_id))
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(TrackLookup::Unauthorized),
            status if status.is_success() => {
                let track: TrackItem = resp.json().await?;
                Ok(TrackLookup::Found(TrackDetails {
                    id: track.id,
                    name: track.name,
                    explicit: track.explicit,
                }))
            }
            status => Ok(TrackLookup::Failed {
                status: status.as_u16(),
            }),
        }
    }

    async fn enqueue_track(&self, access_token: &str, track_id: &str) -> Result<EnqueueOutcome> {
        let resp = self
            .http
            .post(format!("{}/v1/me/player/queue", self.api_base_url))
            .query(&[("uri", format!("spotify:track:{track_id}"))])
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(EnqueueOutcome::Unauthorized),
            StatusCode::NOT_FOUND => Ok(EnqueueOutcome::NoActiveDevice),
            StatusCode::FORBIDDEN => Ok(EnqueueOutcome::PremiumRequired),
            status if status.is_success() => Ok(EnqueueOutcome::Queued),
            status => Ok(EnqueueOutcome::Failed {
                status: status.as_u16(),
                message: Self::error_message(resp).await,
            }),
        }
    }

    async fn currently_playing(&self, access_token: &str) -> Result<PlaybackSnapshot> {
        let resp = self
            .http
            .get(format!(
                "{}/v1/me/player/currently-playing",
                self.api_base_url
            ))
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            // 204 means nothing is playing.
            StatusCode::NO_CONTENT => Ok(PlaybackSnapshot::Idle),
            StatusCode::UNAUTHORIZED => Ok(PlaybackSnapshot::Unauthorized),
            status if status.is_success() => {
                let playing: CurrentlyPlayingResponse = resp.json().await?;
                match playing.item {
                    Some(item) => {
                        let artist_name = item
                            .artists
                            .iter()
                            .map(|artist| artist.name.clone())
                            .collect::<Vec<_>>()
                            .join(", ");
                        Ok(PlaybackSnapshot::Current(CurrentlyPlaying {
                            track_id: item.id,
                            track_name: item.name,
                            artist_name,
                            is_playing: playing.is_playing,
                        }))
                    }
                    None => Ok(PlaybackSnapshot::Idle),
                }
            }
            status => Ok(PlaybackSnapshot::Failed {
                status: status.as_u16(),
            }),
        }
    }

    async fn list_devices(&self, access_token: &str) -> Result<DeviceList> {
        let resp = self
            .http
            .get(format!("{}/v1/me/player/devices", self.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(DeviceList::Unauthorized),
            status if status.is_success() => {
                let parsed: DevicesResponse = resp.json().await?;
                let devices = parsed
                    .devices
                    .into_iter()
                    .filter_map(|device| {
                        device.id.map(|id| PlaybackDevice {
                            id,
                            name: device.name,
                            is_active: device.is_active,
                        })
                    })
                    .collect();
                Ok(DeviceList::Devices(devices))
            }
            status => Ok(DeviceList::Failed {
                status: status.as_u16(),
            }),
        }
    }

    async fn transfer_playback(
        &self,
        access_token: &str,
        device_id: &str,
    ) -> Result<TransferOutcome> {
        let resp = self
            .http
            .put(format!("{}/v1/me/player", self.api_base_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "device_ids": [device_id], "play": false }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(TransferOutcome::Unauthorized),
            status if status.is_success() => Ok(TransferOutcome::Transferred),
            status => Ok(TransferOutcome::Failed {
                status: status.as_u16(),
            }),
        }
    }

    async fn search_tracks(&self, access_token: &str, query: &str) -> Result<TrackListing> {
        let resp = self
            .http
            .get(format!("{}/v1/search", self.api_base_url))
            .query(&[("q", query), ("type", "track"), ("limit", "20")])
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(TrackListing::Unauthorized),
            status if status.is_success() => {
                let parsed: SearchResponse = resp.json().await?;
                Ok(TrackListing::Tracks(
                    parsed.tracks.items.into_iter().map(FoundTrack::from).collect(),
                ))
            }
            status => Ok(TrackListing::Failed {
                status: status.as_u16(),
            }),
        }
    }

    async fn playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<TrackListing> {
        let resp = self
            .http
            .get(format!(
                "{}/v1/playlists/{}/tracks",
                self.api_base_url, playlist_id
            ))
            .query(&[("limit", "50")])
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(TrackListing::Unauthorized),
            status if status.is_success() => {
                let parsed: PlaylistTracksResponse = resp.json().await?;
                Ok(TrackListing::Tracks(
                    parsed
                        .items
                        .into_iter()
                        .filter_map(|item| item.track.map(FoundTrack::from))
                        .collect(),
                ))
            }
            status => Ok(TrackListing::Failed {
                status: status.as_u16(),
            }),
        }
    }
}
