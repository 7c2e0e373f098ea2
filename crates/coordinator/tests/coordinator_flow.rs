//! End-to-end event handling (§4.5, §8): join spawns the pair of pipelines,
//! leave tears them down, a pipeline failure suppresses recreation until a
//! metadata change clears it.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use interlingo_config::{BufferConfig, CoordinatorConfig};
use interlingo_coordinator::{
    CoordinatorEvent, CoordinatorNotification, NoSuchProfileLoader, ProfileCache, ProviderFactory,
    RoomCoordinator,
};
use interlingo_core::{
    AudioFrame, Gender, Language, Preferences, Result as CoreResult, SpeechToText, SttOptions,
    SttResult, TextToSpeech, Translator, TtsHandle, VoiceAvatar,
};
use interlingo_router::{AudioRouter, MediaTransport, TrackRef};
use tokio::sync::mpsc;

struct FakeStt;

#[async_trait]
impl SpeechToText for FakeStt {
    async fn open(
        &self,
        _source_language: Language,
        _options: &SttOptions,
    ) -> CoreResult<(
        mpsc::Sender<AudioFrame>,
        Pin<Box<dyn Stream<Item = CoreResult<SttResult>> + Send>>,
    )> {
        let (frame_tx, _frame_rx) = mpsc::channel(1);
        let (_result_tx, result_rx) = mpsc::channel(1);
        Ok((frame_tx, Box::pin(tokio_stream::wrappers::ReceiverStream::new(result_rx))))
    }

    fn supported_languages(&self) -> &[Language] {
        &[]
    }

    fn provider_name(&self) -> &str {
        "fake-stt"
    }
}

struct FakeTranslator;

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        _target: Language,
        _preferences: Preferences,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> CoreResult<String> {
        Ok(text.to_string())
    }

    fn supports_pair(&self, _source: Language, _target: Language) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "fake-translator"
    }
}

struct FakeTts;

#[async_trait]
impl TextToSpeech for FakeTts {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceAvatar,
        _sink: mpsc::Sender<AudioFrame>,
    ) -> CoreResult<TtsHandle> {
        let (cancel_tx, _cancel_rx) = tokio::sync::oneshot::channel();
        let join = tokio::spawn(async { Ok(()) });
        Ok(TtsHandle::new(cancel_tx, join))
    }

    fn provider_name(&self) -> &str {
        "fake-tts"
    }
}

struct FakeProviderFactory;

impl ProviderFactory for FakeProviderFactory {
    fn build_stt(&self, _source_language: Language) -> Arc<dyn SpeechToText> {
        Arc::new(FakeStt)
    }

    fn build_translator(&self, _source_language: Language, _target_language: Language) -> Arc<dyn Translator> {
        Arc::new(FakeTranslator)
    }

    fn build_tts(&self, _voice: &VoiceAvatar) -> Arc<dyn TextToSpeech> {
        Arc::new(FakeTts)
    }
}

struct NoopTransport;

#[async_trait]
impl MediaTransport for NoopTransport {
    async fn subscribe(&self, _listener: &str, _track: &TrackRef) -> CoreResult<()> {
        Ok(())
    }
    async fn unsubscribe(&self, _listener: &str, _track: &TrackRef) -> CoreResult<()> {
        Ok(())
    }
    async fn publish(&self, _track: &TrackRef) -> CoreResult<()> {
        Ok(())
    }
    async fn unpublish(&self, _track: &TrackRef) -> CoreResult<()> {
        Ok(())
    }
}

fn voice(language: Language) -> VoiceAvatar {
    VoiceAvatar::new("v1", "fake-tts", language, "Voice", Gender::Neutral)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn build_coordinator() -> (
    Arc<RoomCoordinator<NoopTransport>>,
    mpsc::Sender<CoordinatorEvent>,
    mpsc::Receiver<CoordinatorNotification>,
) {
    let router = Arc::new(AudioRouter::new(Arc::new(NoopTransport)));
    RoomCoordinator::spawn(
        "room-1",
        CoordinatorConfig {
            reconciliation_interval_ms: 30_000,
            ..CoordinatorConfig::default()
        },
        BufferConfig::default(),
        Arc::new(ProfileCache::new(Duration::from_secs(1800))),
        Arc::new(NoSuchProfileLoader),
        Arc::new(FakeProviderFactory),
        router,
    )
}

#[tokio::test]
async fn join_with_differing_languages_spawns_both_direction_pipelines() {
    let (coordinator, events, _notifications) = build_coordinator();

    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "alice".into(),
            language: Language::En,
            avatar: voice(Language::En),
        })
        .await
        .unwrap();
    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "bob".into(),
            language: Language::Es,
            avatar: voice(Language::Es),
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(coordinator.active_pipeline_count().await, 2);
}

#[tokio::test]
async fn leave_tears_down_pipelines_involving_that_participant() {
    let (coordinator, events, _notifications) = build_coordinator();

    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "alice".into(),
            language: Language::En,
            avatar: voice(Language::En),
        })
        .await
        .unwrap();
    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "bob".into(),
            language: Language::Es,
            avatar: voice(Language::Es),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(coordinator.active_pipeline_count().await, 2);

    events.send(CoordinatorEvent::ParticipantLeft { identity: "bob".into() }).await.unwrap();
    settle().await;

    assert_eq!(coordinator.active_pipeline_count().await, 0);
}

#[tokio::test]
async fn same_language_participants_never_get_a_pipeline() {
    let (coordinator, events, _notifications) = build_coordinator();

    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "alice".into(),
            language: Language::En,
            avatar: voice(Language::En),
        })
        .await
        .unwrap();
    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "carol".into(),
            language: Language::En,
            avatar: voice(Language::En),
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(coordinator.active_pipeline_count().await, 0);
}

#[tokio::test]
async fn pipeline_failure_is_not_recreated_until_metadata_changes() {
    let (coordinator, events, mut notifications) = build_coordinator();

    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "alice".into(),
            language: Language::En,
            avatar: voice(Language::En),
        })
        .await
        .unwrap();
    events
        .send(CoordinatorEvent::ParticipantJoined {
            identity: "bob".into(),
            language: Language::Es,
            avatar: voice(Language::Es),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(coordinator.active_pipeline_count().await, 2);

    events
        .send(CoordinatorEvent::PipelineFailed {
            listener: "alice".into(),
            speaker: "bob".into(),
            reason: "provider auth failure".into(),
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(coordinator.active_pipeline_count().await, 1);
    let notification = tokio::time::timeout(Duration::from_secs(1), notifications.recv())
        .await
        .expect("expected a failure notification");
    assert!(matches!(notification, Some(CoordinatorNotification::PipelineFailed { .. })));

    // An explicit Tick alone must not resurrect the suppressed pair.
    events.send(CoordinatorEvent::Tick).await.unwrap();
    settle().await;
    assert_eq!(coordinator.active_pipeline_count().await, 1);

    // A metadata change for either side of the pair clears the suppression.
    events
        .send(CoordinatorEvent::ParticipantMetadataChanged {
            identity: "bob".into(),
            language: Language::Es,
            avatar: voice(Language::Es),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(coordinator.active_pipeline_count().await, 2);
}
