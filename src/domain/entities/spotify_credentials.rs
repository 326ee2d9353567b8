use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::spotify_credentials;

/// Per-venue Spotify application identity and token pair.
///
/// `access_token` may be a plain token or, for rows written by an older
/// client, a JSON blob with embedded `access_token`/`refresh_token` fields.
/// The token manager normalizes both encodings before use.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = spotify_credentials)]
pub struct SpotifyCredentialEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub playlist_id: Option<String>,
    pub restrict_to_playlist: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
