use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::provider::FoundTrack;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSearchRequest {
    pub venue_id: Uuid,
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTracksRequest {
    pub venue_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_ms: Option<i64>,
}

impl From<FoundTrack> for TrackDto {
    fn from(value: FoundTrack) -> Self {
        Self {
            id: value.id,
            name: value.name,
            artists: value.artists,
            album: value.album,
            duration_ms: value.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackSearchResponse {
    pub tracks: Vec<TrackDto>,
}
