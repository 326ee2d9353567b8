use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    application::interfaces::provider::ProviderClient,
    domain::{
        repositories::credentials::CredentialRepository,
        value_objects::tokens::{ProviderToken, TokenUpdateModel},
    },
    infrastructure::axum_http::error_responses::AppError,
};

/// Refresh proactively when the stored expiry is missing or within this window.
const REFRESH_WINDOW_SECONDS: i64 = 60;

/// A usable access token for one operation against the provider.
///
/// `refreshed` tracks whether a refresh has already happened during this
/// operation; `retry_unauthorized` consults it so a 401 triggers at most one
/// refresh-and-retry before the failure becomes terminal.
#[derive(Debug)]
pub struct ProviderSession {
    venue_id: Uuid,
    client_id: String,
    client_secret: String,
    access_token: String,
    refresh_token: Option<String>,
    refreshed: bool,
}

impl ProviderSession {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Sole writer of the stored token pair. Every component calls through here
/// before talking to the provider.
pub struct TokenManager<C, P>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    credential_repository: Arc<C>,
    provider_client: Arc<P>,
}

impl<C, P> TokenManager<C, P>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    pub fn new(credential_repository: Arc<C>, provider_client: Arc<P>) -> Self {
        Self {
            credential_repository,
            provider_client,
        }
    }

    /// Cheap connection check without touching the provider.
    pub async fn verify_connected(&self, venue_id: Uuid) -> Result<(), AppError> {
        let credential = self
            .credential_repository
            .find_by_venue_id(venue_id)
            .await?
            .ok_or(AppError::ProviderNotConnected)?;

        if credential.access_token.is_none() {
            return Err(AppError::ProviderNotConnected);
        }
        if credential.client_id.is_none() || credential.client_secret.is_none() {
            return Err(AppError::CredentialsNotConfigured);
        }

        Ok(())
    }

    /// Loads and normalizes the stored credential and returns a session whose
    /// access token is valid for an immediate provider call, refreshing first
    /// when the expiry is absent or inside the refresh window.
    pub async fn begin_session(&self, venue_id: Uuid) -> Result<ProviderSession, AppError> {
        let credential = self
            .credential_repository
            .find_by_venue_id(venue_id)
            .await?
            .ok_or(AppError::ProviderNotConnected)?;

        let stored_access = credential
            .access_token
            .as_deref()
            .ok_or(AppError::ProviderNotConnected)?;
        let client_id = credential
            .client_id
            .clone()
            .ok_or(AppError::CredentialsNotConfigured)?;
        let client_secret = credential
            .client_secret
            .clone()
            .ok_or(AppError::CredentialsNotConfigured)?;

        let token = normalize_stored_token(stored_access, credential.refresh_token.clone())?;

        let mut session = ProviderSession {
            venue_id,
            client_id,
            client_secret,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            refreshed: false,
        };

        let expires_soon = credential.token_expires_at.is_none_or(|expires_at| {
            expires_at - Duration::seconds(REFRESH_WINDOW_SECONDS) <= Utc::now()
        });
        if expires_soon {
            debug!(%venue_id, "access token missing expiry or expiring soon, refreshing");
            self.refresh(&mut session).await?;
        }

        Ok(session)
    }

    /// Reactive path after a 401: refreshes once per operation and reports
    /// whether the caller should retry its call. Returns `false` when a
    /// refresh already happened, so a second 401 stays terminal.
    pub async fn retry_unauthorized(&self, session: &mut ProviderSession) -> Result<bool, AppError> {
        if session.refreshed {
            return Ok(false);
        }
        self.refresh(session).await?;
        Ok(true)
    }

    /// Exchanges an authorization code and persists the initial token pair.
    pub async fn connect(
        &self,
        venue_id: Uuid,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(), AppError> {
        let credential = self
            .credential_repository
            .find_by_venue_id(venue_id)
            .await?
            .ok_or(AppError::ProviderNotConnected)?;

        let client_id = credential
            .client_id
            .ok_or(AppError::CredentialsNotConfigured)?;
        let client_secret = credential
            .client_secret
            .ok_or(AppError::CredentialsNotConfigured)?;

        let grant = self
            .provider_client
            .exchange_code(&client_id, &client_secret, code, redirect_uri)
            .await
            .map_err(|err| {
                error!(%venue_id, error = %err, "authorization code exchange failed");
                AppError::TokenExchangeFailed
            })?;

        let update = TokenUpdateModel {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            token_expires_at: Utc::now() + Duration::seconds(grant.expires_in),
        };
        self.credential_repository
            .update_tokens(venue_id, update)
            .await?;

        Ok(())
    }

    /// Clears the stored token pair on explicit disconnect.
    pub async fn disconnect(&self, venue_id: Uuid) -> Result<(), AppError> {
        self.credential_repository.clear_tokens(venue_id).await?;
        Ok(())
    }

    async fn refresh(&self, session: &mut ProviderSession) -> Result<(), AppError> {
        let refresh_token = session
            .refresh_token
            .clone()
            .ok_or(AppError::TokenRefreshFailed)?;

        let grant = self
            .provider_client
            .refresh_token(&session.client_id, &session.client_secret, &refresh_token)
            .await
            .map_err(|err| {
                warn!(venue_id = %session.venue_id, error = %err, "token refresh failed");
                AppError::TokenRefreshFailed
            })?;

        let token_expires_at = Utc::now() + Duration::seconds(grant.expires_in);
        // Providers may omit rotation; keep the old refresh token then.
        let refresh_token = grant.refresh_token.unwrap_or(refresh_token);

        let update = TokenUpdateModel {
            access_token: grant.access_token.clone(),
            refresh_token: Some(refresh_token.clone()),
            token_expires_at,
        };
        if let Err(err) = self
            .credential_repository
            .update_tokens(session.venue_id, update)
            .await
        {
            error!(venue_id = %session.venue_id, error = %err, "failed to persist refreshed token");
        }

        session.access_token = grant.access_token;
        session.refresh_token = Some(refresh_token);
        session.refreshed = true;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LegacyTokenBlob {
    access_token: String,
    refresh_token: Option<String>,
}

/// Some rows store the access token as a JSON blob with embedded token
/// fields. Normalize both encodings; the refresh-token column wins over an
/// embedded one.
fn normalize_stored_token(
    stored: &str,
    column_refresh_token: Option<String>,
) -> Result<ProviderToken, AppError> {
    if stored.starts_with('{') {
        let blob: LegacyTokenBlob =
            serde_json::from_str(stored).map_err(|_| AppError::MalformedCredential)?;
        return Ok(ProviderToken {
            access_token: blob.access_token,
            refresh_token: column_refresh_token.or(blob.refresh_token),
        });
    }

    Ok(ProviderToken {
        access_token: stored.to_string(),
        refresh_token: column_refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::interfaces::provider::MockProviderClient,
        domain::{
            entities::spotify_credentials::SpotifyCredentialEntity,
            repositories::credentials::MockCredentialRepository,
            value_objects::tokens::TokenGrant,
        },
    };
    use mockall::predicate::eq;

    fn sample_credential(venue_id: Uuid) -> SpotifyCredentialEntity {
        let now = Utc::now();
        SpotifyCredentialEntity {
            id: Uuid::new_v4(),
            venue_id,
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            access_token: Some("stored-access".to_string()),
            refresh_token: Some("stored-refresh".to_string()),
            token_expires_at: Some(now + Duration::hours(1)),
            playlist_id: None,
            restrict_to_playlist: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn grant(access: &str, refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_in: 3600,
        }
    }

    #[tokio::test]
    async fn fresh_token_is_used_without_refresh() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let credential = sample_credential(venue_id);
        credentials
            .expect_find_by_venue_id()
            .with(eq(venue_id))
            .returning(move |_| {
                let credential = credential.clone();
                Box::pin(async move { Ok(Some(credential)) })
            });
        provider.expect_refresh_token().times(0);

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let session = manager.begin_session(venue_id).await.unwrap();

        assert_eq!(session.access_token(), "stored-access");
    }

    #[tokio::test]
    async fn legacy_json_blob_is_normalized() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.access_token = Some(
            r#"{"access_token":"embedded-access","refresh_token":"embedded-refresh"}"#.to_string(),
        );
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider.expect_refresh_token().times(0);

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let session = manager.begin_session(venue_id).await.unwrap();

        assert_eq!(session.access_token(), "embedded-access");
        // Column refresh token takes precedence over the embedded one.
        assert_eq!(session.refresh_token.as_deref(), Some("stored-refresh"));
    }

    #[tokio::test]
    async fn malformed_json_blob_is_a_structured_error() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.access_token = Some("{not valid json".to_string());
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let err = manager.begin_session(venue_id).await.unwrap_err();

        assert!(matches!(err, AppError::MalformedCredential));
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed_and_persisted() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.token_expires_at = Some(Utc::now() + Duration::seconds(30));
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider
            .expect_refresh_token()
            .withf(|client_id, client_secret, refresh_token| {
                client_id == "client-id"
                    && client_secret == "client-secret"
                    && refresh_token == "stored-refresh"
            })
            .times(1)
            .returning(|_, _, _| {
                Box::pin(async { Ok(grant("fresh-access", Some("rotated-refresh"))) })
            });
        credentials
            .expect_update_tokens()
            .withf(move |id, update| {
                *id == venue_id
                    && update.access_token == "fresh-access"
                    && update.refresh_token.as_deref() == Some("rotated-refresh")
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let session = manager.begin_session(venue_id).await.unwrap();

        assert_eq!(session.access_token(), "fresh-access");
    }

    #[tokio::test]
    async fn refresh_keeps_old_refresh_token_when_rotation_is_omitted() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.token_expires_at = None;
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider
            .expect_refresh_token()
            .returning(|_, _, _| Box::pin(async { Ok(grant("fresh-access", None)) }));
        credentials
            .expect_update_tokens()
            .withf(|_, update| update.refresh_token.as_deref() == Some("stored-refresh"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let session = manager.begin_session(venue_id).await.unwrap();

        assert_eq!(session.refresh_token.as_deref(), Some("stored-refresh"));
    }

    #[tokio::test]
    async fn failed_refresh_does_not_mutate_stored_state() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.token_expires_at = None;
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider
            .expect_refresh_token()
            .returning(|_, _, _| Box::pin(async { Err(anyhow::anyhow!("invalid_grant")) }));
        credentials.expect_update_tokens().times(0);

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let err = manager.begin_session(venue_id).await.unwrap_err();

        assert!(matches!(err, AppError::TokenRefreshFailed));
    }

    #[tokio::test]
    async fn unauthorized_retry_refreshes_at_most_once_per_operation() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let credential = sample_credential(venue_id);
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider
            .expect_refresh_token()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(grant("fresh-access", None)) }));
        credentials
            .expect_update_tokens()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let mut session = manager.begin_session(venue_id).await.unwrap();

        assert!(manager.retry_unauthorized(&mut session).await.unwrap());
        // Second 401 in the same operation must not trigger another refresh.
        assert!(!manager.retry_unauthorized(&mut session).await.unwrap());
    }

    #[tokio::test]
    async fn proactive_refresh_counts_against_the_retry_budget() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let mut provider = MockProviderClient::new();

        let mut credential = sample_credential(venue_id);
        credential.token_expires_at = None;
        credentials.expect_find_by_venue_id().returning(move |_| {
            let credential = credential.clone();
            Box::pin(async move { Ok(Some(credential)) })
        });
        provider
            .expect_refresh_token()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(grant("fresh-access", None)) }));
        credentials
            .expect_update_tokens()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        let mut session = manager.begin_session(venue_id).await.unwrap();

        assert!(!manager.retry_unauthorized(&mut session).await.unwrap());
    }

    #[tokio::test]
    async fn disconnect_clears_stored_tokens() {
        let venue_id = Uuid::new_v4();
        let mut credentials = MockCredentialRepository::new();
        let provider = MockProviderClient::new();

        credentials
            .expect_clear_tokens()
            .with(eq(venue_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let manager = TokenManager::new(Arc::new(credentials), Arc::new(provider));
        manager.disconnect(venue_id).await.unwrap();
    }
}
