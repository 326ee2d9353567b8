use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::profiles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = profiles)]
pub struct VenueProfileEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub venue_name: String,
    pub email: String,
    pub allow_queueing: bool,
    pub enable_pricing: bool,
    pub dynamic_pricing: bool,
    pub static_price_minor: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
