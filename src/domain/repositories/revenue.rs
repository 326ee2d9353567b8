use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::venue_revenue::InsertRevenueEntryEntity;

#[async_trait]
#[automock]
pub trait RevenueRepository {
    async fn insert(&self, insert_revenue: InsertRevenueEntryEntity) -> Result<Uuid>;
}
