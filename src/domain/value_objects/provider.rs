//! Tagged per-operation results for the music provider API. Handlers match
//! on these instead of raw status codes.

#[derive(Debug, Clone, PartialEq)]
pub struct TrackDetails {
    pub id: String,
    pub name: String,
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackLookup {
    Found(TrackDetails),
    Unauthorized,
    Failed { status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueOutcome {
    Queued,
    Unauthorized,
    NoActiveDevice,
    PremiumRequired,
    Failed { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentlyPlaying {
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackSnapshot {
    Current(CurrentlyPlaying),
    Idle,
    Unauthorized,
    Failed { status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackDevice {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceList {
    Devices(Vec<PlaybackDevice>),
    Unauthorized,
    Failed { status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Transferred,
    Unauthorized,
    Failed { status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_ms: Option<i64>,
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackListing {
    Tracks(Vec<FoundTrack>),
    Unauthorized,
    Failed { status: u16 },
}
