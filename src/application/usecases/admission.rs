use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::{
        interfaces::provider::ProviderClient,
        usecases::token_manager::{ProviderSession, TokenManager},
    },
    domain::{
        entities::song_queue::InsertQueueEntryEntity,
        repositories::{
            credentials::CredentialRepository, queue::QueueRepository, venues::VenueRepository,
        },
        value_objects::{
            enums::queue_statuses::QueueStatus,
            provider::{DeviceList, EnqueueOutcome, TrackLookup, TransferOutcome},
            queue::{AckResponse, AdmitSongRequest},
        },
    },
    infrastructure::axum_http::error_responses::AppError,
};

/// Admits one guest song request into a venue's queue after policy and
/// payment checks, pushing it to the provider's playback queue first.
pub struct AdmissionUseCase<V, Q, C, P>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    venue_repository: Arc<V>,
    queue_repository: Arc<Q>,
    token_manager: Arc<TokenManager<C, P>>,
    provider_client: Arc<P>,
}

impl<V, Q, C, P> AdmissionUseCase<V, Q, C, P>
where
    V: VenueRepository + Send + Sync + 'static,
    Q: QueueRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    P: ProviderClient + Send + Sync + 'static,
{
    pub fn new(
        venue_repository: Arc<V>,
        queue_repository: Arc<Q>,
        token_manager: Arc<TokenManager<C, P>>,
        provider_client: Arc<P>,
    ) -> Self {
        Self {
            venue_repository,
            queue_repository,
            token_manager,
            provider_client,
        }
    }

    pub async fn admit(&self, request: AdmitSongRequest) -> Result<AckResponse, AppError> {
        let artist_name = request.artist_names.join(", ");

        let venue = self
            .venue_repository
            .find_by_venue_id(request.venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        if !venue.allow_queueing {
            return Err(AppError::QueueingDisabled);
        }

        self.token_manager.verify_connected(request.venue_id).await?;

        // Hard precondition: a priced venue never admits without a proven
        // payment session. Confirmation attaches the reference after paying.
        if venue.enable_pricing && request.payment_session_id.is_none() {
            return Err(AppError::PaymentRequired);
        }

        let mut session = self.token_manager.begin_session(request.venue_id).await?;

        // Content policy. A failed metadata fetch is tolerated rather than
        // blocking every admission; the queue call below still authenticates.
        let mut lookup = self
            .provider_client
            .track_details(session.access_token(), &request.track_id)
            .await?;
        if matches!(lookup, TrackLookup::Unauthorized)
            && self.token_manager.retry_unauthorized(&mut session).await?
        {
            lookup = self
                .provider_client
                .track_details(session.access_token(), &request.track_id)
                .await?;
        }
        match lookup {
            TrackLookup::Found(track) if track.explicit => {
                return Err(AppError::ContentRejected);
            }
            TrackLookup::Found(_) => {}
            TrackLookup::Unauthorized | TrackLookup::Failed { .. } => {
                warn!(
                    venue_id = %request.venue_id,
                    track_id = %request.track_id,
                    "track metadata unavailable, skipping explicit check"
                );
            }
        }

        let mut outcome = self
            .provider_client
            .enqueue_track(session.access_token(), &request.track_id)
            .await?;
        if matches!(outcome, EnqueueOutcome::Unauthorized)
            && self.token_manager.retry_unauthorized(&mut session).await?
        {
            outcome = self
                .provider_client
                .enqueue_track(session.access_token(), &request.track_id)
                .await?;
        }

        match outcome {
            EnqueueOutcome::Queued => {}
            EnqueueOutcome::Unauthorized => return Err(AppError::ProviderAuthFailed),
            EnqueueOutcome::PremiumRequired => return Err(AppError::PremiumRequired),
            EnqueueOutcome::NoActiveDevice => {
                if let Err(err) = self.remediate_missing_device(&mut session).await {
                    warn!(venue_id = %request.venue_id, error = %err, "device remediation failed");
                    return Err(AppError::NoActiveDevice);
                }
                let retried = self
                    .provider_client
                    .enqueue_track(session.access_token(), &request.track_id)
                    .await?;
                if !matches!(retried, EnqueueOutcome::Queued) {
                    return Err(AppError::NoActiveDevice);
                }
            }
            EnqueueOutcome::Failed { status, message } => {
                error!(
                    venue_id = %request.venue_id,
                    status,
                    message = %message,
                    "provider rejected queue request"
                );
                return Err(AppError::ProviderQueueFailed(message));
            }
        }

        // The provider-side enqueue is the source of truth for playback; the
        // local row is an analytics/display mirror, so its failure does not
        // fail the request.
        if let Err(err) = self.mirror_queue_entry(&request, &artist_name).await {
            error!(
                venue_id = %request.venue_id,
                track_id = %request.track_id,
                error = %err,
                "failed to mirror queue entry"
            );
        }

        info!(
            venue_id = %request.venue_id,
            track_id = %request.track_id,
            song_name = %request.track_name,
            "song queued"
        );

        Ok(AckResponse::ok(format!(
            "\"{}\" by {} queued successfully!",
            request.track_name, artist_name
        )))
    }

    /// One remediation attempt when the provider reports no active playback
    /// device: prefer the active device, else the first available, transfer
    /// playback to it. Any failure surfaces as `NoActiveDevice` upstream.
    async fn remediate_missing_device(
        &self,
        session: &mut ProviderSession,
    ) -> Result<(), AppError> {
        let mut devices = self
            .provider_client
            .list_devices(session.access_token())
            .await?;
        if matches!(devices, DeviceList::Unauthorized)
            && matches!(
                self.token_manager.retry_unauthorized(session).await,
                Ok(true)
            )
        {
            devices = self
                .provider_client
                .list_devices(session.access_token())
                .await?;
        }

        let devices = match devices {
            DeviceList::Devices(devices) => devices,
            _ => return Err(AppError::NoActiveDevice),
        };
        let target = devices
            .iter()
            .find(|device| device.is_active)
            .or_else(|| devices.first())
            .ok_or(AppError::NoActiveDevice)?;

        let mut transfer = self
            .provider_client
            .transfer_playback(session.access_token(), &target.id)
            .await?;
        if matches!(transfer, TransferOutcome::Unauthorized)
            && matches!(
                self.token_manager.retry_unauthorized(session).await,
                Ok(true)
            )
        {
            transfer = self
                .provider_client
                .transfer_playback(session.access_token(), &target.id)
                .await?;
        }

        match transfer {
            TransferOutcome::Transferred => Ok(()),
            _ => Err(AppError::NoActiveDevice),
        }
    }

    async fn mirror_queue_entry(
        &self,
        request: &AdmitSongRequest,
        artist_name: &str,
    ) -> anyhow::Result<i32> {
        let next_position = self
            .queue_repository
            .max_position(request.venue_id)
            .await?
            .unwrap_or(0)
            + 1;

        let insert_entry = InsertQueueEntryEntity {
            venue_id: request.venue_id,
            track_id: request.track_id.clone(),
            song_name: request.track_name.clone(),
            artist_name: artist_name.to_string(),
            position: Some(next_position),
            status: QueueStatus::Pending.to_string(),
            requester_name: request.requester_name.clone(),
        };
        self.queue_repository.insert(insert_entry).await?;

        Ok(next_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::interfaces::provider::MockProviderClient,
        domain::{
            entities::{
                profiles::VenueProfileEntity, spotify_credentials::SpotifyCredentialEntity,
            },
            repositories::{
                credentials::MockCredentialRepository, queue::MockQueueRepository,
                venues::MockVenueRepository,
            },
            value_objects::provider::{PlaybackDevice, TrackDetails},
        },
    };
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn sample_venue(venue_id: Uuid, enable_pricing: bool) -> VenueProfileEntity {
        let now = Utc::now();
        VenueProfileEntity {
            id: Uuid::new_v4(),
            venue_id,
            venue_name: "Test Venue".to_string(),
            email: "venue@example.com".to_string(),
            allow_queueing: true,
            enable_pricing,
            dynamic_pricing: false,
            static_price_minor: Some(99),
            created_at: now,
            updated_at: now,
        }
    }

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

    fn request(venue_id: Uuid, payment_session_id: Option<&str>) -> AdmitSongRequest {
        AdmitSongRequest {
            venue_id,
            track_id: "track-1".to_string(),
            track_name: "X".to_string(),
            artist_names: vec!["Y".to_string()],
            requester_name: None,
            payment_session_id: payment_session_id.map(str::to_string),
        }
    }

    fn clean_track() -> TrackLookup {
        TrackLookup::Found(TrackDetails {
            id: "track-1".to_string(),
            name: "X".to_string(),
            explicit: false,
        })
    }

    struct Mocks {
        venues: MockVenueRepository,
        queue: MockQueueRepository,
        credentials: MockCredentialRepository,
        provider: MockProviderClient,
    }

    impl Mocks {
        fn new(venue_id: Uuid, enable_pricing: bool) -> Self {
            let mut venues = MockVenueRepository::new();
            let venue = sample_venue(venue_id, enable_pricing);
            venues.expect_find_by_venue_id().returning(move |_| {
                let venue = venue.clone();
                Box::pin(async move { Ok(Some(venue)) })
            });

            let mut credentials = MockCredentialRepository::new();
            let credential = sample_credential(venue_id);
            credentials.expect_find_by_venue_id().returning(move |_| {
                let credential = credential.clone();
                Box::pin(async move { Ok(Some(credential)) })
            });

            Self {
                venues,
                queue: MockQueueRepository::new(),
                credentials,
                provider: MockProviderClient::new(),
            }
        }

        fn into_usecase(
            self,
        ) -> AdmissionUseCase<
            MockVenueRepository,
            MockQueueRepository,
            MockCredentialRepository,
            MockProviderClient,
        > {
            let provider = Arc::new(self.provider);
            let token_manager =
                TokenManager::new(Arc::new(self.credentials), Arc::clone(&provider));
            AdmissionUseCase::new(
                Arc::new(self.venues),
                Arc::new(self.queue),
                Arc::new(token_manager),
                provider,
            )
        }
    }

    #[tokio::test]
    async fn priced_venue_without_payment_reference_is_rejected_before_any_queueing() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, true);

        mocks.provider.expect_enqueue_track().times(0);
        mocks.queue.expect_insert().times(0);

        let usecase = mocks.into_usecase();
        let err = usecase.admit(request(venue_id, None)).await.unwrap_err();

        assert!(matches!(err, AppError::PaymentRequired));
    }

    #[tokio::test]
    async fn free_admission_succeeds_and_names_track_and_artist() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::Queued) }));
        mocks
            .queue
            .expect_max_position()
            .returning(|_| Box::pin(async { Ok(None) }));
        mocks
            .queue
            .expect_insert()
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = mocks.into_usecase();
        let response = usecase.admit(request(venue_id, None)).await.unwrap();

        assert!(response.success);
        assert!(response.message.contains("X"));
        assert!(response.message.contains("Y"));
    }

    #[tokio::test]
    async fn sequential_admissions_assign_strictly_increasing_positions() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::Queued) }));

        let calls = Arc::new(AtomicUsize::new(0));
        let max_calls = Arc::clone(&calls);
        mocks.queue.expect_max_position().returning(move |_| {
            let highest = match max_calls.load(Ordering::SeqCst) {
                0 => None,
                n => Some(n as i32),
            };
            Box::pin(async move { Ok(highest) })
        });

        let inserted = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&inserted);
        let insert_calls = Arc::clone(&calls);
        mocks.queue.expect_insert().returning(move |entry| {
            sink.lock().unwrap().push(entry.position);
            insert_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Uuid::new_v4()) })
        });

        let usecase = mocks.into_usecase();
        for _ in 0..3 {
            usecase.admit(request(venue_id, None)).await.unwrap();
        }

        assert_eq!(
            *inserted.lock().unwrap(),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[tokio::test]
    async fn explicit_track_is_rejected_without_queueing() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks.provider.expect_track_details().returning(|_, _| {
            Box::pin(async {
                Ok(TrackLookup::Found(TrackDetails {
                    id: "track-1".to_string(),
                    name: "X".to_string(),
                    explicit: true,
                }))
            })
        });
        mocks.provider.expect_enqueue_track().times(0);
        mocks.queue.expect_insert().times(0);

        let usecase = mocks.into_usecase();
        let err = usecase.admit(request(venue_id, None)).await.unwrap_err();

        assert!(matches!(err, AppError::ContentRejected));
    }

    #[tokio::test]
    async fn insufficient_plan_tier_is_forbidden() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::PremiumRequired) }));

        let usecase = mocks.into_usecase();
        let err = usecase.admit(request(venue_id, None)).await.unwrap_err();

        assert!(matches!(err, AppError::PremiumRequired));
    }

    #[tokio::test]
    async fn missing_device_is_remediated_with_one_transfer_and_retry() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));

        let enqueue_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&enqueue_calls);
        mocks
            .provider
            .expect_enqueue_track()
            .times(2)
            .returning(move |_, _| {
                let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
                Box::pin(async move {
                    Ok(if first {
                        EnqueueOutcome::NoActiveDevice
                    } else {
                        EnqueueOutcome::Queued
                    })
                })
            });
        mocks.provider.expect_list_devices().returning(|_| {
            Box::pin(async {
                Ok(DeviceList::Devices(vec![
                    PlaybackDevice {
                        id: "idle-device".to_string(),
                        name: "Kitchen".to_string(),
                        is_active: false,
                    },
                    PlaybackDevice {
                        id: "bar-device".to_string(),
                        name: "Bar".to_string(),
                        is_active: true,
                    },
                ]))
            })
        });
        mocks
            .provider
            .expect_transfer_playback()
            .withf(|_, device_id| device_id == "bar-device")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(TransferOutcome::Transferred) }));
        mocks
            .queue
            .expect_max_position()
            .returning(|_| Box::pin(async { Ok(None) }));
        mocks
            .queue
            .expect_insert()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = mocks.into_usecase();
        let response = usecase.admit(request(venue_id, None)).await.unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn failed_remediation_surfaces_no_active_device() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::NoActiveDevice) }));
        mocks
            .provider
            .expect_list_devices()
            .returning(|_| Box::pin(async { Ok(DeviceList::Devices(Vec::new())) }));
        mocks.queue.expect_insert().times(0);

        let usecase = mocks.into_usecase();
        let err = usecase.admit(request(venue_id, None)).await.unwrap_err();

        assert!(matches!(err, AppError::NoActiveDevice));
    }

    #[tokio::test]
    async fn unauthorized_enqueue_refreshes_once_and_retries() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));

        let enqueue_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&enqueue_calls);
        mocks
            .provider
            .expect_enqueue_track()
            .times(2)
            .returning(move |_, _| {
                let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
                Box::pin(async move {
                    Ok(if first {
                        EnqueueOutcome::Unauthorized
                    } else {
                        EnqueueOutcome::Queued
                    })
                })
            });
        mocks
            .provider
            .expect_refresh_token()
            .times(1)
            .returning(|_, _, _| {
                Box::pin(async {
                    Ok(crate::domain::value_objects::tokens::TokenGrant {
                        access_token: "fresh-access".to_string(),
                        refresh_token: None,
                        expires_in: 3600,
                    })
                })
            });
        mocks
            .credentials
            .expect_update_tokens()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        mocks
            .queue
            .expect_max_position()
            .returning(|_| Box::pin(async { Ok(None) }));
        mocks
            .queue
            .expect_insert()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = mocks.into_usecase();
        let response = usecase.admit(request(venue_id, None)).await.unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn two_consecutive_unauthorized_responses_are_terminal() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::Unauthorized) }));
        mocks
            .provider
            .expect_refresh_token()
            .times(1)
            .returning(|_, _, _| {
                Box::pin(async {
                    Ok(crate::domain::value_objects::tokens::TokenGrant {
                        access_token: "fresh-access".to_string(),
                        refresh_token: None,
                        expires_in: 3600,
                    })
                })
            });
        mocks
            .credentials
            .expect_update_tokens()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        mocks.queue.expect_insert().times(0);

        let usecase = mocks.into_usecase();
        let err = usecase.admit(request(venue_id, None)).await.unwrap_err();

        assert!(matches!(err, AppError::ProviderAuthFailed));
    }

    #[tokio::test]
    async fn mirror_insert_failure_does_not_fail_the_request() {
        let venue_id = Uuid::new_v4();
        let mut mocks = Mocks::new(venue_id, false);

        mocks
            .provider
            .expect_track_details()
            .returning(|_, _| Box::pin(async { Ok(clean_track()) }));
        mocks
            .provider
            .expect_enqueue_track()
            .returning(|_, _| Box::pin(async { Ok(EnqueueOutcome::Queued) }));
        mocks
            .queue
            .expect_max_position()
            .returning(|_| Box::pin(async { Ok(None) }));
        mocks
            .queue
            .expect_insert()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection reset")) }));

        let usecase = mocks.into_usecase();
        let response = usecase.admit(request(venue_id, None)).await.unwrap();

        assert!(response.success);
    }
}
