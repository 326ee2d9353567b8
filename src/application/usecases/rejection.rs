use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    application::{
        interfaces::provider::ProviderClient,
        usecases::token_manager::TokenManager,
    },
    domain::{
        entities::rejected_songs::InsertRejectedSongEntity,
        repositories::{
            credentials::CredentialRepository, queue::QueueRepository,
            rejections::RejectionRepository,
        },
        value_objects::queue::{AckResponse, RejectSongRequest},
    },
    infrastructure::axum_http::error_responses::AppError,
};

const DEFAULT_REJECTION_REASON: &str = "Rejected by venue";

/// Operator-initiated removal of a queue entry, independent of the
/// reconciler's lifecycle transitions.
pub struct RejectionUseCase<Q, R, C, P>
where
    Q: QueueRepository + Send + Sync + 'static,
    R: RejectionRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    queue_repository: Arc<Q>,
    rejection_repository: Arc<R>,
    token_manager: Arc<TokenManager<C, P>>,
}

impl<Q, R, C, P> RejectionUseCase<Q, R, C, P>
where
    Q: QueueRepository + Send + Sync + 'static,
    R: RejectionRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    pub fn new(
        queue_repository: Arc<Q>,
        rejection_repository: Arc<R>,
        token_manager: Arc<TokenManager<C, P>>,
    ) -> Self {
        Self {
            queue_repository,
            rejection_repository,
            token_manager,
        }
    }

    pub async fn reject(&self, request: RejectSongRequest) -> Result<AckResponse, AppError> {
        let entry = self
            .queue_repository
            .find_by_id(request.queue_item_id, request.venue_id)
            .await?
            .ok_or(AppError::EntryNotFound)?;

        // Best-effort provider-side removal. The provider's API has no way to
        // remove an arbitrary queue item, so this resolves to a logged no-op;
        // an unusable session is not surfaced either.
        match self.token_manager.begin_session(request.venue_id).await {
            Ok(_session) => debug!(
                track_id = %entry.track_id,
                "provider queue does not support targeted removal, deleting locally only"
            ),
            Err(err) => warn!(
                venue_id = %request.venue_id,
                error = %err,
                "no usable provider session during rejection"
            ),
        }

        let rejection_reason = request
            .rejection_reason
            .clone()
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        // Durable record first; only then remove the queue row.
        self.rejection_repository
            .insert(InsertRejectedSongEntity {
                venue_id: request.venue_id,
                track_id: entry.track_id.clone(),
                song_name: entry.song_name.clone(),
                artist_name: entry.artist_name.clone(),
                rejection_reason,
                rejected_at: Utc::now(),
            })
            .await?;

        self.queue_repository
            .delete(entry.id, request.venue_id)
            .await?;

        info!(
            venue_id = %request.venue_id,
            entry_id = %entry.id,
            song_name = %entry.song_name,
            "song rejected"
        );

        Ok(AckResponse::ok(format!(
            "\"{}\" by {} has been rejected and removed from queue",
            entry.song_name, entry.artist_name
        )))
    }
}
