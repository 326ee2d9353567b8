use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::song_plays::InsertPlayRecordEntity;

#[async_trait]
#[automock]
pub trait PlayHistoryRepository {
    async fn insert(&self, insert_play: InsertPlayRecordEntity) -> Result<Uuid>;
}
