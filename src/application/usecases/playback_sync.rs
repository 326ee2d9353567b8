use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
    application::{
        interfaces::provider::ProviderClient,
        usecases::token_manager::TokenManager,
    },
    domain::{
        entities::{song_plays::InsertPlayRecordEntity, song_queue::QueueEntryEntity},
        repositories::{
            credentials::CredentialRepository, play_history::PlayHistoryRepository,
            queue::QueueRepository,
        },
        value_objects::{
            enums::queue_statuses::QueueStatus,
            playback::{CurrentTrackDto, SyncPlaybackRequest, SyncReport},
            provider::PlaybackSnapshot,
        },
    },
    infrastructure::axum_http::error_responses::AppError,
};

/// Aligns the internal queue with the provider's actual playback state.
///
/// Stateless between invocations: every pass compares against the current
/// provider snapshot, never a remembered one, so re-running with unchanged
/// state writes nothing and concurrent passes converge on the next cycle.
pub struct PlaybackSyncUseCase<C, P, Q, H>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    token_manager: Arc<TokenManager<C, P>>,
    provider_client: Arc<P>,
    queue_repository: Arc<Q>,
    play_history_repository: Arc<H>,
}

impl<C, P, Q, H> PlaybackSyncUseCase<C, P, Q, H>
where
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    H: PlayHistoryRepository + Send + Sync + 'static,
{
    pub fn new(
        token_manager: Arc<TokenManager<C, P>>,
        provider_client: Arc<P>,
        queue_repository: Arc<Q>,
        play_history_repository: Arc<H>,
    ) -> Self {
        Self {
            token_manager,
            provider_client,
            queue_repository,
            play_history_repository,
        }
    }

    pub async fn sync(&self, request: SyncPlaybackRequest) -> Result<SyncReport, AppError> {
        let venue_id = request.venue_id;
        let mut session = self.token_manager.begin_session(venue_id).await?;

        let mut snapshot = self
            .provider_client
            .currently_playing(session.access_token())
            .await?;
        if matches!(snapshot, PlaybackSnapshot::Unauthorized)
            && self.token_manager.retry_unauthorized(&mut session).await?
        {
            snapshot = self
                .provider_client
                .currently_playing(session.access_token())
                .await?;
        }

        let current = match snapshot {
            PlaybackSnapshot::Current(current) => Some(current),
            PlaybackSnapshot::Idle => None,
            PlaybackSnapshot::Unauthorized => return Err(AppError::ProviderAuthFailed),
            PlaybackSnapshot::Failed { status } => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "currently-playing fetch failed with status {status}"
                )));
            }
        };

        let entries = self.queue_repository.list_active(venue_id).await?;
        let now = Utc::now();
        let mut updates = Vec::new();

        let pending_status = QueueStatus::Pending.to_string();
        let playing_status = QueueStatus::Playing.to_string();

        let active_track_id = current
            .as_ref()
            .filter(|current| current.is_playing)
            .map(|current| current.track_id.clone());

        if let Some(track_id) = &active_track_id {
            if let Some(entry) = entries
                .iter()
                .find(|entry| entry.status == pending_status && &entry.track_id == track_id)
            {
                self.queue_repository.mark_playing(entry.id, now).await?;
                updates.push(format!("Song \"{}\" marked as playing", entry.song_name));
            }
        }

        // Entries still marked playing that no longer match the provider's
        // current track get archived. Normally one; drain all defensively.
        let superseded = entries.iter().filter(|entry| {
            entry.status == playing_status
                && active_track_id.as_deref() != Some(entry.track_id.as_str())
        });
        for entry in superseded {
            match self.archive_entry(entry, now).await {
                Ok(()) => updates.push(format!(
                    "Song \"{}\" completed and moved to play history",
                    entry.song_name
                )),
                Err(err) => error!(
                    %venue_id,
                    entry_id = %entry.id,
                    error = %err,
                    "failed to archive queue entry, leaving it for the next cycle"
                ),
            }
        }

        info!(%venue_id, updates = updates.len(), "playback reconciled");

        Ok(SyncReport {
            success: true,
            updates,
            current_track: current.map(|current| CurrentTrackDto {
                name: current.track_name,
                artist: current.artist_name,
                is_playing: current.is_playing,
            }),
        })
    }

    /// Archive-then-delete, in that order: a failed insert leaves the queue
    /// entry intact so the next cycle retries instead of losing history.
    async fn archive_entry(
        &self,
        entry: &QueueEntryEntity,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let duration_ms = entry
            .started_playing_at
            .map(|started_at| (now - started_at).num_milliseconds());

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

        self.queue_repository.delete(entry.id, entry.venue_id).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::interfaces::provider::MockProviderClient,
        domain::{
            entities::spotify_credentials::SpotifyCredentialEntity,
            repositories::{
                credentials::MockCredentialRepository, play_history::MockPlayHistoryRepository,
                queue::MockQueueRepository,
            },
            value_objects::provider::CurrentlyPlaying,
        },
    };
    use chrono::Duration;
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn sample_credential(venue_id: Uuid) -> SpotifyCredentialEntity {
        let now = Utc::now();
        SpotifyCredentialEntity {
            id: Uuid::new_v4(),
            venue_id,
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            token_expires_at: Some(now + Duration::hours(1)),
            playlist_id: None,
            restrict_to_playlist: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn queue_entry(
        venue_id: Uuid,
        track_id: &str,
        status: QueueStatus,
        started_playing_at: Option<DateTime<Utc>>,
    ) -> QueueEntryEntity {
        QueueEntryEntity {
            id: Uuid::new_v4(),
            venue_id,
            track_id: track_id.to_string(),
            song_name: format!("Song {}", track_id),
            artist_name: "Artist".to_string(),
            position: Some(1),
            status: status.to_string(),
            requested_at: Utc::now(),
            requester_name: None,
            started_playing_at,
        }
    }

    fn playing_snapshot(track_id: &str, is_playing: bool) -> PlaybackSnapshot {
        PlaybackSnapshot::Current(CurrentlyPlaying {
            track_id: track_id.to_string(),
            track_name: format!("Song {}", track_id),
            artist_name: "Artist".to_string(),
            is_playing,
        })
    }

    struct Mocks {
        credentials: MockCredentialRepository,
        provider: MockProviderClient,
        queue: MockQueueRepository,
        history: MockPlayHistoryRepository,
    }

    impl Mocks {
        fn new(venue_id: Uuid) -> Self {
            let mut credentials = MockCredentialRepository::new();
            let credential = sample_credential(venue_id);
            credentials.expect_find_by_venue_id().returning(move |_| {
                let credential = credential.clone();
                Box::pin(async move { Ok(Some(credential)) })
            });

            Self {
                credentials,
                provider: MockProviderClient::new(),
                queue: MockQueueRepository::new(),
                history: MockPlayHistoryRepository::new(),
            }
        }

        fn into_usecase(
            self,
        ) -> PlaybackSyncUseCase<
            MockCredentialRepository,
            MockProviderClient,
            MockQueueRepository,
            MockPlayHistoryRepository,
        > {
            let provider = Arc::new(self.provider);
            let token_manager =
                TokenManager::new(Arc::new(self.credentials), Arc::clone(&provider));
            PlaybackSyncUseCase::new(
                Arc::new(token_manager),
                provider,
                Arc::new(self.queue),
                Arc::new(self.history),
            )
        }
    }

    #[tokio::test]
    async fn matching_pending_entry_is_promoted_to_playing() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        let entry = queue_entry(venue_id, "track-a", QueueStatus::Pending, None);
        let entry_id = entry.id;

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(playing_snapshot("track-a", true)) }));
        mocks.queue.expect_list_active().returning(move |_| {
            let entries = vec![entry.clone()];
            Box::pin(async move { Ok(entries) })
        });
        mocks
            .queue
            .expect_mark_playing()
            .withf(move |id, _| *id == entry_id)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        mocks.history.expect_insert().times(0);
        mocks.queue.expect_delete().times(0);

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.updates.len(), 1);
        assert!(report.current_track.unwrap().is_playing);
    }

    #[tokio::test]
    async fn second_pass_with_unchanged_state_writes_nothing() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        let entry = queue_entry(
            venue_id,
            "track-a",
            QueueStatus::Playing,
            Some(Utc::now() - Duration::seconds(10)),
        );

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(playing_snapshot("track-a", true)) }));
        mocks.queue.expect_list_active().returning(move |_| {
            let entries = vec![entry.clone()];
            Box::pin(async move { Ok(entries) })
        });
        mocks.queue.expect_mark_playing().times(0);
        mocks.history.expect_insert().times(0);
        mocks.queue.expect_delete().times(0);

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        assert!(report.updates.is_empty());
    }

    #[tokio::test]
    async fn stopped_playback_archives_the_playing_entry() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        let started_at = Utc::now() - Duration::seconds(30);
        let entry = queue_entry(venue_id, "track-a", QueueStatus::Playing, Some(started_at));
        let entry_id = entry.id;

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(playing_snapshot("track-a", false)) }));
        mocks.queue.expect_list_active().returning(move |_| {
            let entries = vec![entry.clone()];
            Box::pin(async move { Ok(entries) })
        });
        mocks
            .history
            .expect_insert()
            .withf(move |record| {
                record.venue_id == venue_id
                    && record.track_id == "track-a"
                    && record
                        .duration_ms
                        .is_some_and(|ms| (25_000..=35_000).contains(&ms))
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));
        mocks
            .queue
            .expect_delete()
            .with(eq(entry_id), eq(venue_id))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        assert_eq!(report.updates.len(), 1);
    }

    #[tokio::test]
    async fn superseded_entry_is_archived_while_next_is_promoted() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        let playing = queue_entry(
            venue_id,
            "track-old",
            QueueStatus::Playing,
            Some(Utc::now() - Duration::seconds(200)),
        );
        let pending = queue_entry(venue_id, "track-new", QueueStatus::Pending, None);
        let pending_id = pending.id;

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(playing_snapshot("track-new", true)) }));
        mocks.queue.expect_list_active().returning(move |_| {
            let entries = vec![playing.clone(), pending.clone()];
            Box::pin(async move { Ok(entries) })
        });
        mocks
            .queue
            .expect_mark_playing()
            .withf(move |id, _| *id == pending_id)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        mocks
            .history
            .expect_insert()
            .withf(|record| record.track_id == "track-old")
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));
        mocks
            .queue
            .expect_delete()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        assert_eq!(report.updates.len(), 2);
    }

    #[tokio::test]
    async fn failed_archive_insert_skips_the_delete() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        let entry = queue_entry(
            venue_id,
            "track-a",
            QueueStatus::Playing,
            Some(Utc::now() - Duration::seconds(30)),
        );

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(PlaybackSnapshot::Idle) }));
        mocks.queue.expect_list_active().returning(move |_| {
            let entries = vec![entry.clone()];
            Box::pin(async move { Ok(entries) })
        });
        mocks
            .history
            .expect_insert()
            .times(1)
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection reset")) }));
        mocks.queue.expect_delete().times(0);

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        // The entry stays queued for the next cycle.
        assert!(report.updates.is_empty());
    }

    #[tokio::test]
    async fn idle_playback_with_empty_queue_is_a_no_op() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id);

        mocks
            .provider
            .expect_currently_playing()
            .returning(|_| Box::pin(async { Ok(PlaybackSnapshot::Idle) }));
        mocks
            .queue
            .expect_list_active()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));
        mocks.queue.expect_mark_playing().times(0);
        mocks.history.expect_insert().times(0);
        mocks.queue.expect_delete().times(0);

        let usecase = mocks.into_usecase();
        let report = usecase
            .sync(SyncPlaybackRequest { venue_id })
            .await
            .unwrap();

        assert!(report.updates.is_empty());
        assert!(report.current_track.is_none());
    }
}
