use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::spotify_credentials::SpotifyCredentialEntity, value_objects::tokens::TokenUpdateModel,
};

#[async_trait]
#[automock]
pub trait CredentialRepository {
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Option<SpotifyCredentialEntity>>;

    /// Overwrites the stored token triple. Only the token manager calls this.
    async fn update_tokens(&self, venue_id: Uuid, update: TokenUpdateModel) -> Result<()>;

    /// Clears access/refresh token and expiry on explicit disconnect.
    async fn clear_tokens(&self, venue_id: Uuid) -> Result<()>;
}
