use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::{
    domain::{
        entities::song_plays::InsertPlayRecordEntity,
        repositories::{play_history::PlayHistoryRepository, queue::QueueRepository},
        value_objects::queue::{AckResponse, SongStatusUpdate, UpdateSongStatusRequest},
    },
    infrastructure::axum_http::error_responses::AppError,
};

/// Operator-driven status override for a single queue entry. `completed`
/// reuses the reconciler's archive-then-delete unit.
pub struct SongStatusUseCase<Q, H>
where
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    queue_repository: Arc<Q>,
    play_history_repository: Arc<H>,
}

impl<Q, H> SongStatusUseCase<Q, H>
where
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    pub fn new(queue_repository: Arc<Q>, play_history_repository: Arc<H>) -> Self {
        Self {
            queue_repository,
            play_history_repository,
        }
    }

    pub async fn update_status(
        &self,
        request: UpdateSongStatusRequest,
    ) -> Result<AckResponse, AppError> {
        let entry = self
            .queue_repository
            .find_by_id(request.queue_item_id, request.venue_id)
            .await?
            .ok_or(AppError::EntryNotFound)?;

        let now = Utc::now();

        match request.status {
            SongStatusUpdate::Playing => {
                self.queue_repository.mark_playing(entry.id, now).await?;
            }
            SongStatusUpdate::Completed => {
                let duration_ms = entry
                    .started_playing_at
                    .map(|started_at| (now - started_at).num_milliseconds());

                // Archive before delete; a failed insert leaves the entry.
                self.play_history_repository
                    .insert(InsertPlayRecordEntity {
                        venue_id: entry.venue_id,
                        track_id: entry.track_id.clone(),
                        song_name: entry.song_name.clone(),
                        artist_name: entry.artist_name.clone(),
                        played_at: now,
                        duration_ms,
                    })
                    .await?;

                self.queue_repository
                    .delete(entry.id, request.venue_id)
                    .await?;
            }
        }

        info!(
            venue_id = %request.venue_id,
            entry_id = %entry.id,
            status = %request.status,
            "song status updated"
        );

        Ok(AckResponse::ok(format!(
            "Song status updated to {}",
            request.status
        )))
    }
}
