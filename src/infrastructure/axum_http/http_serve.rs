use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{Router, http::Method, routing::get};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::config_model::DotEnvyConfig,
    infrastructure::{
        axum_http::{default_routers, routers},
        postgres::postgres_connection::PgPoolSquad,
        spotify::client::SpotifyClient,
    },
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let spotify_client = Arc::new(SpotifyClient::new(
        config.spotify.accounts_base_url.clone(),
        config.spotify.api_base_url.clone(),
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .route("/api/v1/health-check", get(default_routers::health_check))
        .merge(routers::queue::routes(
            Arc::clone(&db_pool),
            Arc::clone(&spotify_client),
        ))
        .merge(routers::payments::routes(
            Arc::clone(&db_pool),
            Arc::clone(&spotify_client),
            Arc::clone(&config),
        ))
        .merge(routers::playback::routes(
            Arc::clone(&db_pool),
            Arc::clone(&spotify_client),
        ))
        .merge(routers::tracks::routes(
            Arc::clone(&db_pool),
            Arc::clone(&spotify_client),
        ))
        .merge(routers::spotify_auth::routes(
            Arc::clone(&db_pool),
            Arc::clone(&spotify_client),
            config.spotify.redirect_uri.clone(),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            // The kiosk and dashboard run on other origins; endpoints answer
            // preflights permissively.
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Received ctrl+C signal");
}
