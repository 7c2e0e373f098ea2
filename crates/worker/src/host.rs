//! Worker Host (§4.6): accepts room-assignment jobs, binds a Room
//! Coordinator to each, and tears it down on cancellation or an
//! empty-room timeout. One process may run many room jobs concurrently,
//! each isolated from the others.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use interlingo_config::{BufferConfig, CoordinatorConfig};
use interlingo_core::{Language, VoiceAvatar};
use interlingo_coordinator::{CoordinatorEvent, NoSuchProfileLoader, ProfileCache, ProfileLoader, ProviderFactory, RoomCoordinator, TranslationStats};
use interlingo_router::AudioRouter;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::WorkerError;
use crate::transport::LoggingTransport;

/// A room-assignment job description, matching §4.6 step 1.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomJob {
    pub room_id: String,
    pub room_type: String,
    #[serde(default)]
    pub seed_metadata: Vec<SeedParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedParticipant {
    pub identity: String,
    pub language: String,
    pub avatar_voice_id: String,
}

struct RoomJobHandle {
    coordinator: Arc<RoomCoordinator<LoggingTransport>>,
    events: mpsc::Sender<CoordinatorEvent>,
}

/// Owns every room this process is currently running a job for.
pub struct WorkerHost {
    rooms: DashMap<String, RoomJobHandle>,
    profile_cache: Arc<ProfileCache>,
    profile_loader: Arc<dyn ProfileLoader>,
    provider_factory: Arc<dyn ProviderFactory>,
    coordinator_config: CoordinatorConfig,
    buffer_config: BufferConfig,
}

impl WorkerHost {
    pub fn new(
        profile_loader: Arc<dyn ProfileLoader>,
        provider_factory: Arc<dyn ProviderFactory>,
        coordinator_config: CoordinatorConfig,
        buffer_config: BufferConfig,
    ) -> Self {
        Self {
            rooms: DashMap::new(),
            profile_cache: Arc::new(ProfileCache::new(Duration::from_millis(coordinator_config.profile_cache_ttl_ms))),
            profile_loader,
            provider_factory,
            coordinator_config,
            buffer_config,
        }
    }

    /// Bare-bones host with no persistence: every profile lookup must be a
    /// cache hit from seed metadata. Used when persistence is unreachable
    /// at startup (§10.5's graceful-fallback `main()`).
    pub fn without_persistence(
        provider_factory: Arc<dyn ProviderFactory>,
        coordinator_config: CoordinatorConfig,
        buffer_config: BufferConfig,
    ) -> Self {
        Self::new(Arc::new(NoSuchProfileLoader), provider_factory, coordinator_config, buffer_config)
    }

    /// §4.6 steps 2-4: fetch present participants' profiles, instantiate a
    /// Coordinator, and seed it with the job's initial participants.
    pub async fn accept_job(&self, job: RoomJob) -> Result<(), WorkerError> {
        let router = Arc::new(AudioRouter::new(Arc::new(LoggingTransport::new(job.room_id.clone()))));
        let (coordinator, events, mut notifications) = RoomCoordinator::spawn(
            job.room_id.clone(),
            self.coordinator_config.clone(),
            self.buffer_config.clone(),
            self.profile_cache.clone(),
            self.profile_loader.clone(),
            self.provider_factory.clone(),
            router,
        );

        let room_id_for_log = job.room_id.clone();
        tokio::spawn(async move {
            while let Some(notification) = notifications.recv().await {
                tracing::info!(room_id = %room_id_for_log, ?notification, "coordinator notification");
            }
        });

        for participant in job.seed_metadata {
            let Some(language) = Language::parse(&participant.language) else {
                tracing::warn!(identity = %participant.identity, language = %participant.language, "unrecognized language in seed metadata, skipping participant");
                continue;
            };
            let avatar = VoiceAvatar::new(participant.avatar_voice_id, "unknown", language, "", interlingo_core::Gender::Neutral);
            let _ = events
                .send(CoordinatorEvent::ParticipantJoined { identity: participant.identity, language, avatar })
                .await;
        }

        self.rooms.insert(job.room_id, RoomJobHandle { coordinator, events });
        Ok(())
    }

    /// §4.6 step 5: tear down the Coordinator and all its pipelines.
    pub async fn cancel_job(&self, room_id: &str) -> Result<(), WorkerError> {
        let Some((_, handle)) = self.rooms.remove(room_id) else {
            return Err(WorkerError::UnknownRoom(room_id.to_string()));
        };
        handle.coordinator.shutdown().await;
        Ok(())
    }

    pub fn events_sender(&self, room_id: &str) -> Option<mpsc::Sender<CoordinatorEvent>> {
        self.rooms.get(room_id).map(|entry| entry.events.clone())
    }

    pub async fn stats(&self, room_id: &str) -> Result<TranslationStats, WorkerError> {
        let entry = self.rooms.get(room_id).ok_or_else(|| WorkerError::UnknownRoom(room_id.to_string()))?;
        Ok(entry.coordinator.stats_snapshot().await)
    }

    pub fn active_room_count(&self) -> usize {
        self.rooms.len()
    }

    pub async fn shutdown_all(&self) {
        let room_ids: Vec<String> = self.rooms.iter().map(|entry| entry.key().clone()).collect();
        for room_id in room_ids {
            let _ = self.cancel_job(&room_id).await;
        }
    }
}
