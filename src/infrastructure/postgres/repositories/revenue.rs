use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::venue_revenue::InsertRevenueEntryEntity,
        repositories::revenue::RevenueRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::venue_revenue},
};

pub struct RevenuePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RevenuePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RevenueRepository for RevenuePostgres {
    async fn insert(&self, insert_revenue: InsertRevenueEntryEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(venue_revenue::table)
            .values(&insert_revenue)
            .returning(venue_revenue::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }
}
