use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::rejected_songs::InsertRejectedSongEntity,
        repositories::rejections::RejectionRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::rejected_songs},
};

pub struct RejectionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RejectionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RejectionRepository for RejectionPostgres {
    async fn insert(&self, insert_rejection: InsertRejectedSongEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(rejected_songs::table)
            .values(&insert_rejection)
            .returning(rejected_songs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }
}
