pub mod payments;
pub mod playback;
pub mod queue;
pub mod spotify_auth;
pub mod tracks;
