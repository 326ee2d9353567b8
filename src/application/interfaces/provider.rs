use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    provider::{DeviceList, EnqueueOutcome, PlaybackSnapshot, TrackListing, TrackLookup, TransferOutcome},
    tokens::TokenGrant,
};

/// Seam to the music provider's HTTP API. Token grants return `Err` on any
/// non-success; playback/catalog calls return tagged outcomes so callers can
/// drive the refresh-and-retry and device-remediation flows.
#[async_trait]
#[automock]
pub trait ProviderClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant>;

    async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenGrant>;

    async fn client_credentials_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenGrant>;

    async fn track_details(&self, access_token: &str, track_id: &str) -> Result<TrackLookup>;

    async fn enqueue_track(&self, access_token: &str, track_id: &str) -> Result<EnqueueOutcome>;

    async fn currently_playing(&self, access_token: &str) -> Result<PlaybackSnapshot>;

    async fn list_devices(&self, access_token: &str) -> Result<DeviceList>;

    async fn transfer_playback(&self, access_token: &str, device_id: &str)
    -> Result<TransferOutcome>;

    async fn search_tracks(&self, access_token: &str, query: &str) -> Result<TrackListing>;

    async fn playlist_tracks(&self, access_token: &str, playlist_id: &str)
    -> Result<TrackListing>;
}
