use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::{interfaces::provider::ProviderClient, usecases::token_manager::TokenManager},
    domain::{
        repositories::credentials::CredentialRepository,
        value_objects::{queue::AckResponse, tokens::DisconnectRequest},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::credentials::CredentialPostgres,
        },
        spotify::client::SpotifyClient,
    },
};

pub struct SpotifyAuthState<C, P>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    token_manager: Arc<TokenManager<C, P>>,
    redirect_uri: String,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    spotify_client: Arc<SpotifyClient>,
    redirect_uri: String,
) -> Router {
    let credential_repository = Arc::new(CredentialPostgres::new(Arc::clone(&db_pool)));
    let token_manager = Arc::new(TokenManager::new(credential_repository, spotify_client));

    Router::new()
        .route("/api/v1/spotify/callback", get(callback))
        .route("/api/v1/spotify/disconnect", post(disconnect))
        .with_state(Arc::new(SpotifyAuthState {
            token_manager,
            redirect_uri,
        }))
}

/// The provider redirects here after the venue operator authorizes the app.
/// `state` carries the venue id. Responses are small self-closing HTML pages
/// because this lands in a popup, not in the SPA.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn callback<C, P>(
    State(auth_state): State<Arc<SpotifyAuthState<C, P>>>,
    Query(params): Query<CallbackParams>,
) -> Html<String>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    if let Some(error) = params.error {
        warn!(%error, "spotify authorization denied");
        return render_page(
            "Connection Failed",
            &format!("There was an error connecting to Spotify: {error}"),
        );
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        return render_page(
            "Invalid Request",
            "Missing authorization code or venue information.",
        );
    };

    let Ok(venue_id) = Uuid::parse_str(&state) else {
        return render_page("Invalid Request", "Malformed venue information.");
    };

    match auth_state
        .token_manager
        .connect(venue_id, &code, &auth_state.redirect_uri)
        .await
    {
        Ok(()) => render_page(
            "Successfully Connected!",
            "Your venue has been connected to Spotify. You can close this window and return to your dashboard.",
        ),
        Err(err) => {
            warn!(%venue_id, error = %err, "spotify connection failed");
            render_page("Connection Failed", &err.to_string())
        }
    }
}

pub async fn disconnect<C, P>(
    State(auth_state): State<Arc<SpotifyAuthState<C, P>>>,
    Json(disconnect_request): Json<DisconnectRequest>,
) -> Result<Json<AckResponse>, AppError>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    auth_state
        .token_manager
        .disconnect(disconnect_request.venue_id)
        .await?;

    Ok(Json(AckResponse::ok(
        "Spotify has been disconnected".to_string(),
    )))
}

fn render_page(heading: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{heading}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body style="font-family: sans-serif; padding: 40px; text-align: center;">
  <div style="max-width: 400px; margin: 0 auto;">
    <h2>{heading}</h2>
    <p>{body}</p>
    <button onclick="window.close()">Close Window</button>
  </div>
</body>
</html>
"#
    ))
}
