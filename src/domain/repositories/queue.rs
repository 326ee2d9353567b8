use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::song_queue::{InsertQueueEntryEntity, QueueEntryEntity};

#[async_trait]
#[automock]
pub trait QueueRepository {
    async fn max_position(&self, venue_id: Uuid) -> Result<Option<i32>>;

    async fn insert(&self, insert_entry: InsertQueueEntryEntity) -> Result<Uuid>;

    async fn find_by_id(&self, entry_id: Uuid, venue_id: Uuid)
    -> Result<Option<QueueEntryEntity>>;

    /// Pending and playing entries ordered by position, nulls last.
    async fn list_active(&self, venue_id: Uuid) -> Result<Vec<QueueEntryEntity>>;

    async fn count_pending(&self, venue_id: Uuid) -> Result<i64>;

    async fn mark_playing(&self, entry_id: Uuid, started_at: DateTime<Utc>) -> Result<()>;

    async fn delete(&self, entry_id: Uuid, venue_id: Uuid) -> Result<()>;
}
