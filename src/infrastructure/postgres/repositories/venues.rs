use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::{entities::profiles::VenueProfileEntity, repositories::venues::VenueRepository},
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::profiles},
};

pub struct VenuePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VenuePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VenueRepository for VenuePostgres {
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Option<VenueProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = profiles::table
            .filter(profiles::venue_id.eq(venue_id))
            .select(VenueProfileEntity::as_select())
            .first::<VenueProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
