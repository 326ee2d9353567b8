use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::spotify_credentials::SpotifyCredentialEntity,
        repositories::credentials::CredentialRepository,
        value_objects::tokens::TokenUpdateModel,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::spotify_credentials},
};

pub struct CredentialPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CredentialPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CredentialRepository for CredentialPostgres {
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Option<SpotifyCredentialEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = spotify_credentials::table
            .filter(spotify_credentials::venue_id.eq(venue_id))
            .select(SpotifyCredentialEntity::as_select())
            .first::<SpotifyCredentialEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_tokens(&self, venue_id: Uuid, token_update: TokenUpdateModel) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(spotify_credentials::table)
            .filter(spotify_credentials::venue_id.eq(venue_id))
            .set((
                spotify_credentials::access_token.eq(Some(token_update.access_token)),
                spotify_credentials::refresh_token.eq(token_update.refresh_token),
                spotify_credentials::token_expires_at.eq(Some(token_update.token_expires_at)),
                spotify_credentials::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn clear_tokens(&self, venue_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(spotify_credentials::table)
            .filter(spotify_credentials::venue_id.eq(venue_id))
            .set((
                spotify_credentials::access_token.eq(None::<String>),
                spotify_credentials::refresh_token.eq(None::<String>),
                spotify_credentials::token_expires_at.eq(None::<chrono::DateTime<Utc>>),
                spotify_credentials::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
