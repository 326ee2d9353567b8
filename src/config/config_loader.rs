use anyhow::Result;

use super::config_model::{Database, DotEnvyConfig, Server, Spotify, Stripe};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let spotify = Spotify {
        accounts_base_url: std::env::var("SPOTIFY_ACCOUNTS_BASE_URL")
            .unwrap_or_else(|_| "https://accounts.spotify.com".to_string()),
        api_base_url: std::env::var("SPOTIFY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.spotify.com".to_string()),
        redirect_uri: std::env::var("SPOTIFY_REDIRECT_URI")
            .expect("SPOTIFY_REDIRECT_URI is invalid"),
    };

    let stripe = Stripe {
        secret_key: std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY is invalid"),
        currency: std::env::var("STRIPE_CURRENCY").unwrap_or_else(|_| "sek".to_string()),
        success_url: std::env::var("STRIPE_SUCCESS_URL").expect("STRIPE_SUCCESS_URL is invalid"),
        cancel_url: std::env::var("STRIPE_CANCEL_URL").expect("STRIPE_CANCEL_URL is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        spotify,
        stripe,
    })
}
