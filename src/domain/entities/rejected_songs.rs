use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::rejected_songs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = rejected_songs)]
pub struct RejectedSongEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub rejection_reason: String,
    pub rejected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rejected_songs)]
pub struct InsertRejectedSongEntity {
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub rejection_reason: String,
    pub rejected_at: DateTime<Utc>,
}
