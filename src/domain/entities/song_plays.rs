use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::song_plays;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = song_plays)]
pub struct PlayRecordEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub played_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = song_plays)]
pub struct InsertPlayRecordEntity {
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub played_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
}
