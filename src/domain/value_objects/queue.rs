use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmitSongRequest {
    pub venue_id: Uuid,
    pub track_id: String,
    pub track_name: String,
    pub artist_names: Vec<String>,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub payment_session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectSongRequest {
    pub queue_item_id: Uuid,
    pub venue_id: Uuid,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SongStatusUpdate {
    Playing,
    Completed,
}

impl std::fmt::Display for SongStatusUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SongStatusUpdate::Playing => "playing",
            SongStatusUpdate::Completed => "completed",
        };
        write!(f, "{}", status)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSongStatusRequest {
    pub queue_item_id: Uuid,
    pub venue_id: Uuid,
    pub status: SongStatusUpdate,
}

/// Shared success envelope for queue operations.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
