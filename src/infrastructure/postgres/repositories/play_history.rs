use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::song_plays::InsertPlayRecordEntity,
        repositories::play_history::PlayHistoryRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::song_plays},
};

pub struct PlayHistoryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlayHistoryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlayHistoryRepository for PlayHistoryPostgres {
    async fn insert(&self, insert_play: InsertPlayRecordEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(song_plays::table)
            .values(&insert_play)
            .returning(song_plays::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }
}
