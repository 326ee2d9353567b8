pub mod admission;
pub mod payment_gate;
pub mod playback_sync;
pub mod rejection;
pub mod song_status;
pub mod token_manager;
pub mod track_search;
