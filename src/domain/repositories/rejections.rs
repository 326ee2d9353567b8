use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::rejected_songs::InsertRejectedSongEntity;

#[async_trait]
#[automock]
pub trait RejectionRepository {
    async fn insert(&self, insert_rejection: InsertRejectedSongEntity) -> Result<Uuid>;
}
