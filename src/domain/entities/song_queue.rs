use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::song_queue;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = song_queue)]
pub struct QueueEntryEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub position: Option<i32>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub requester_name: Option<String>,
    pub started_playing_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = song_queue)]
pub struct InsertQueueEntryEntity {
    pub venue_id: Uuid,
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub position: Option<i32>,
    pub status: String,
    pub requester_name: Option<String>,
}
