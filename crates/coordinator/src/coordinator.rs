//! Authoritative per-room state machine (§4.5): reacts to participant and
//! pipeline-lifecycle events, spawns/tears down Pipelines, keeps the Audio
//! Router's topology in sync, and runs a periodic reconciliation sweep as
//! the recovery path for missed events.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use interlingo_buffer::BufferPolicy;
use interlingo_config::{BufferConfig, CoordinatorConfig};
use interlingo_core::AudioFrame;
use interlingo_pipeline::{self as pipeline, PipelineEvent, PipelineHandle, PipelineParticipants};
use interlingo_router::{AudioRouter, MediaTransport, ParticipantState, RoomState};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{mpsc, Mutex};

use crate::event::{CoordinatorEvent, CoordinatorNotification};
use crate::profile_cache::{ProfileCache, ProfileLoader};
use crate::provider_factory::ProviderFactory;
use crate::registry::{RegisteredParticipant, RoomRegistry};

/// Read model behind the Worker Host's `GET /rooms/{room_id}/translation-stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationStats {
    pub room_id: String,
    pub participant_count: usize,
    pub active_pipeline_count: usize,
    pub suppressed_pair_count: usize,
}

pub fn buffer_policy_from_config(cfg: &BufferConfig) -> BufferPolicy {
    BufferPolicy {
        max_delay_ms: cfg.max_delay_ms,
        interim_trigger_ms: cfg.interim_trigger_ms,
        utterance_end_ms: cfg.utterance_end_ms,
        interim_word_delta: cfg.interim_word_delta,
    }
}

struct PipelineEntry {
    handle: PipelineHandle,
    audio_in: mpsc::Sender<AudioFrame>,
    audio_out: SyncMutex<Option<mpsc::Receiver<AudioFrame>>>,
}

pub struct RoomCoordinator<T: MediaTransport> {
    room_id: String,
    registry: Mutex<RoomRegistry>,
    pipelines: Mutex<HashMap<(String, String), PipelineEntry>>,
    /// Pairs whose pipeline failed and must not be auto-recreated until a
    /// metadata change or explicit operator command clears them (§4.5).
    suppressed: Mutex<HashSet<(String, String)>>,
    profile_cache: Arc<ProfileCache>,
    profile_loader: Arc<dyn ProfileLoader>,
    provider_factory: Arc<dyn ProviderFactory>,
    router: Arc<AudioRouter<T>>,
    buffer_policy: BufferPolicy,
    pipeline_event_tx: mpsc::Sender<(String, String, PipelineEvent)>,
    notifications: mpsc::Sender<CoordinatorNotification>,
}

impl<T: MediaTransport> RoomCoordinator<T> {
    /// Builds a coordinator and spawns its event loop. Returns the
    /// coordinator handle plus the sender the Worker Host feeds transport
    /// events through, and a receiver of outward-facing notifications.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        room_id: impl Into<String>,
        config: CoordinatorConfig,
        buffer_config: BufferConfig,
        profile_cache: Arc<ProfileCache>,
        profile_loader: Arc<dyn ProfileLoader>,
        provider_factory: Arc<dyn ProviderFactory>,
        router: Arc<AudioRouter<T>>,
    ) -> (
        Arc<Self>,
        mpsc::Sender<CoordinatorEvent>,
        mpsc::Receiver<CoordinatorNotification>,
    ) {
        let (events_tx, events_rx) = mpsc::channel(64);
        let (pipeline_event_tx, pipeline_event_rx) = mpsc::channel(64);
        let (notifications_tx, notifications_rx) = mpsc::channel(64);

        let coordinator = Arc::new(Self {
            room_id: room_id.into(),
            registry: Mutex::new(RoomRegistry::default()),
            pipelines: Mutex::new(HashMap::new()),
            suppressed: Mutex::new(HashSet::new()),
            profile_cache,
            profile_loader,
            provider_factory,
            router,
            buffer_policy: buffer_policy_from_config(&buffer_config),
            pipeline_event_tx,
            notifications: notifications_tx,
        });

        tokio::spawn(coordinator.clone().run(
            events_rx,
            pipeline_event_rx,
            Duration::from_millis(config.reconciliation_interval_ms),
        ));

        (coordinator, events_tx, notifications_rx)
    }

    async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<CoordinatorEvent>,
        mut pipeline_events: mpsc::Receiver<(String, String, PipelineEvent)>,
        reconciliation_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(reconciliation_interval);
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    }
                }
                pipeline_event = pipeline_events.recv() => {
                    if let Some((listener, speaker, event)) = pipeline_event {
                        self.handle_pipeline_event(listener, speaker, event).await;
                    }
                }
                _ = ticker.tick() => {
                    self.reconcile().await;
                }
            }
        }
        tracing::info!(room_id = %self.room_id, "coordinator event loop exiting");
    }

    async fn handle_event(&self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::ParticipantJoined { identity, language, avatar } => {
                self.registry.lock().await.upsert(RegisteredParticipant { identity, language, avatar });
                self.reconcile().await;
            }
            CoordinatorEvent::ParticipantLeft { identity } => {
                self.registry.lock().await.remove(&identity);
                self.teardown_involving(&identity).await;
                self.reconcile().await;
            }
            CoordinatorEvent::ParticipantMetadataChanged { identity, language, avatar } => {
                self.teardown_involving(&identity).await;
                self.suppressed.lock().await.retain(|(l, s)| l != &identity && s != &identity);
                self.registry.lock().await.upsert(RegisteredParticipant { identity, language, avatar });
                self.reconcile().await;
            }
            CoordinatorEvent::PipelineFailed { listener, speaker, reason } => {
                self.teardown_pair(&listener, &speaker).await;
                self.suppressed.lock().await.insert((listener.clone(), speaker.clone()));
                let _ = self
                    .notifications
                    .send(CoordinatorNotification::PipelineFailed { listener, speaker, reason })
                    .await;
            }
            CoordinatorEvent::Tick => self.reconcile().await,
        }
    }

    async fn handle_pipeline_event(&self, listener: String, speaker: String, event: PipelineEvent) {
        match event {
            PipelineEvent::Failed { reason } => {
                self.handle_event(CoordinatorEvent::PipelineFailed { listener, speaker, reason }).await;
            }
            PipelineEvent::Terminated => {
                tracing::debug!(%listener, %speaker, "pipeline reported terminated");
            }
        }
    }

    /// Diffs the registry's predicate against the live pipeline set and
    /// corrects drift (§4.5): the recovery path for missed events, and the
    /// only place pipelines are actually created or destroyed.
    async fn reconcile(&self) {
        let expected: HashSet<(String, String)> = self.registry.lock().await.expected_pairs().into_iter().collect();
        let suppressed = self.suppressed.lock().await.clone();

        let existing: HashSet<(String, String)> = self.pipelines.lock().await.keys().cloned().collect();

        for pair in existing.difference(&expected) {
            self.teardown_pair(&pair.0, &pair.1).await;
        }

        for (listener, speaker) in expected.difference(&existing) {
            if suppressed.contains(&(listener.clone(), speaker.clone())) {
                continue;
            }
            self.spawn_pair(listener, speaker).await;
        }

        self.sync_router().await;
    }

    async fn spawn_pair(&self, listener: &str, speaker: &str) {
        let (source_language, speaker_identity) = {
            let registry = self.registry.lock().await;
            match registry.get(speaker) {
                Some(p) => (p.language, p.identity.clone()),
                None => return,
            }
        };
        let target_language = {
            let registry = self.registry.lock().await;
            match registry.get(listener) {
                Some(p) => p.language,
                None => return,
            }
        };

        let listener_profile = match self.profile_cache.get(listener, self.profile_loader.as_ref()).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(%listener, error = %err, "could not resolve listener profile, deferring pipeline spawn");
                return;
            }
        };

        let stt = self.provider_factory.build_stt(source_language);
        let translator = self.provider_factory.build_translator(source_language, target_language);
        let tts = self.provider_factory.build_tts(&listener_profile.preferred_voice_avatar);

        let (audio_in_tx, audio_in_rx) = mpsc::channel(32);
        let (audio_out_tx, audio_out_rx) = mpsc::channel(32);
        let events_tx = self.pipeline_event_tx.clone();
        let (listener_owned, speaker_owned) = (listener.to_string(), speaker.to_string());

        let (forward_tx, mut forward_rx) = mpsc::channel(8);
        tokio::spawn(async move {
            while let Some(event) = forward_rx.recv().await {
                if events_tx.send((listener_owned.clone(), speaker_owned.clone(), event)).await.is_err() {
                    break;
                }
            }
        });

        let handle = pipeline::spawn(
            PipelineParticipants {
                speaker_identity,
                source_language,
                listener_identity: listener.to_string(),
                target_language,
                listener_voice: listener_profile.preferred_voice_avatar.clone(),
                preferences: listener_profile.preferences,
            },
            pipeline::PipelineConfig::default(),
            stt,
            translator,
            tts,
            audio_in_rx,
            audio_out_tx,
            forward_tx,
        );

        self.pipelines.lock().await.insert(
            (listener.to_string(), speaker.to_string()),
            PipelineEntry {
                handle,
                audio_in: audio_in_tx,
                audio_out: SyncMutex::new(Some(audio_out_rx)),
            },
        );
        tracing::info!(%listener, %speaker, "pipeline spawned");
    }

    async fn teardown_pair(&self, listener: &str, speaker: &str) {
        if let Some(entry) = self.pipelines.lock().await.remove(&(listener.to_string(), speaker.to_string())) {
            entry.handle.request_drain();
            tracing::info!(%listener, %speaker, "pipeline draining for teardown");
        }
    }

    async fn teardown_involving(&self, identity: &str) {
        let pairs: Vec<(String, String)> = self
            .pipelines
            .lock()
            .await
            .keys()
            .filter(|(l, s)| l == identity || s == identity)
            .cloned()
            .collect();
        for (listener, speaker) in pairs {
            self.teardown_pair(&listener, &speaker).await;
        }
    }

    async fn sync_router(&self) {
        let participants: Vec<ParticipantState> = self
            .registry
            .lock()
            .await
            .participants()
            .map(|p| ParticipantState {
                identity: p.identity.clone(),
                language: p.language,
                present: true,
            })
            .collect();
        let room = RoomState { participants };
        match self.router.set_topology(&room).await {
            Ok(plan) if !plan.is_empty() => {
                let _ = self
                    .notifications
                    .send(CoordinatorNotification::TopologyChanged { actions: plan.len() })
                    .await;
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(room_id = %self.room_id, error = %err, "failed to apply router topology"),
        }
    }

    /// Feeds one raw audio frame from `speaker` into every pipeline where
    /// they are the source, so an external transport bridge never needs to
    /// know the pipeline map's shape.
    pub async fn feed_speaker_audio(&self, speaker: &str, frame: AudioFrame) {
        let pipelines = self.pipelines.lock().await;
        for ((_, pair_speaker), entry) in pipelines.iter() {
            if pair_speaker == speaker {
                let _ = entry.audio_in.send(frame.clone()).await;
            }
        }
    }

    /// Hands the translated-audio receiver for one (listener, speaker)
    /// pair to the caller exactly once; a transport bridge consumes it to
    /// publish frames on the track the Router already arranged.
    pub async fn take_translated_audio(&self, listener: &str, speaker: &str) -> Option<mpsc::Receiver<AudioFrame>> {
        let pipelines = self.pipelines.lock().await;
        let entry = pipelines.get(&(listener.to_string(), speaker.to_string()))?;
        let taken = entry.audio_out.lock().take();
        taken
    }

    pub async fn active_pipeline_count(&self) -> usize {
        self.pipelines.lock().await.len()
    }

    /// A point-in-time read model for `GET /rooms/{room_id}/translation-stats`
    /// (§6.1, §10.4). Cheap: just snapshots the counts the Coordinator
    /// already tracks, no extra bookkeeping.
    pub async fn stats_snapshot(&self) -> TranslationStats {
        TranslationStats {
            room_id: self.room_id.clone(),
            participant_count: self.registry.lock().await.participants().count(),
            active_pipeline_count: self.pipelines.lock().await.len(),
            suppressed_pair_count: self.suppressed.lock().await.len(),
        }
    }

    pub async fn shutdown(&self) {
        let pairs: Vec<(String, String)> = self.pipelines.lock().await.keys().cloned().collect();
        for (listener, speaker) in pairs {
            self.teardown_pair(&listener, &speaker).await;
        }
    }
}
