use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::profiles::VenueProfileEntity;

#[async_trait]
#[automock]
pub trait VenueRepository {
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Option<VenueProfileEntity>>;
}
