use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::venue_revenue;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = venue_revenue)]
pub struct RevenueEntryEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub amount_minor: i32,
    pub currency: String,
    pub source: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = venue_revenue)]
pub struct InsertRevenueEntryEntity {
    pub venue_id: Uuid,
    pub amount_minor: i32,
    pub currency: String,
    pub source: String,
    pub description: Option<String>,
}
