use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{delete, dsl::max, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::song_queue::{InsertQueueEntryEntity, QueueEntryEntity},
        repositories::queue::QueueRepository,
        value_objects::enums::queue_statuses::QueueStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::song_queue},
};

pub struct QueuePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl QueuePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl QueueRepository for QueuePostgres {
    async fn max_position(&self, venue_id: Uuid) -> Result<Option<i32>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = song_queue::table
            .filter(song_queue::venue_id.eq(venue_id))
            .select(max(song_queue::position))
            .first::<Option<i32>>(&mut conn)?;

        Ok(result)
    }

    async fn insert(&self, insert_entry: InsertQueueEntryEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(song_queue::table)
            .values(&insert_entry)
            .returning(song_queue::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(
        &self,
        entry_id: Uuid,
        venue_id: Uuid,
    ) -> Result<Option<QueueEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = song_queue::table
            .filter(song_queue::id.eq(entry_id))
            .filter(song_queue::venue_id.eq(venue_id))
            .select(QueueEntryEntity::as_select())
            .first::<QueueEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_active(&self, venue_id: Uuid) -> Result<Vec<QueueEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = song_queue::table
            .filter(song_queue::venue_id.eq(venue_id))
            .filter(song_queue::status.eq_any([
                QueueStatus::Pending.to_string(),
                QueueStatus::Playing.to_string(),
            ]))
            .order(song_queue::position.asc().nulls_last())
            .select(QueueEntryEntity::as_select())
            .load::<QueueEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn count_pending(&self, venue_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = song_queue::table
            .filter(song_queue::venue_id.eq(venue_id))
            .filter(song_queue::status.eq(QueueStatus::Pending.to_string()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(result)
    }

    async fn mark_playing(&self, entry_id: Uuid, started_at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(song_queue::table)
            .filter(song_queue::id.eq(entry_id))
            .set((
                song_queue::status.eq(QueueStatus::Playing.to_string()),
                song_queue::started_playing_at.eq(Some(started_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, entry_id: Uuid, venue_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(song_queue::table)
            .filter(song_queue::id.eq(entry_id))
            .filter(song_queue::venue_id.eq(venue_id))
            .execute(&mut conn)?;

        Ok(())
    }
}
