//! Exercises the full STT -> buffer/translator -> TTS flow (§4.3, §8) with
//! fake provider adapters, plus the draining and persistent-failure paths.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use interlingo_core::{
    AudioFrame, Channels, CoreError, Gender, Language, Preferences, Result as CoreResult, SampleRate,
    SpeechToText, SttOptions, SttResult, TextToSpeech, Translator, TtsHandle, VoiceAvatar,
};
use interlingo_pipeline::{spawn, PipelineConfig, PipelineEvent, PipelineParticipants, PipelineState};
use tokio::sync::mpsc;

fn frame(sequence: u64) -> AudioFrame {
    AudioFrame::new(vec![0.1; 160], SampleRate::Hz16000, Channels::Mono, sequence)
}

fn voice() -> VoiceAvatar {
    VoiceAvatar::new("v1", "fake-tts", Language::Es, "Fake Voice", Gender::Neutral)
}

/// Emits one final hypothesis per frame it receives, echoing the frame's
/// sequence number as the segment id.
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
        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(8);
        let (result_tx, result_rx) = mpsc::channel::<CoreResult<SttResult>>(8);

        tokio::spawn(async move {
            while let Some(incoming) = frame_rx.recv().await {
                let result = SttResult {
                    segment_id: incoming.sequence,
                    text: format!("hello {}", incoming.sequence),
                    is_final: true,
                    confidence: 0.9,
                    ts_start_ms: 0,
                    ts_end_ms: 20,
                };
                if result_tx.send(Ok(result)).await.is_err() {
                    break;
                }
            }
        });

        Ok((
            frame_tx,
            Box::pin(tokio_stream::wrappers::ReceiverStream::new(result_rx)),
        ))
    }

    fn supported_languages(&self) -> &[Language] {
        &[Language::En]
    }

    fn provider_name(&self) -> &str {
        "fake-stt"
    }
}

/// Always fails to open; used to exercise the persistent-failure path.
struct FailingStt;

#[async_trait]
impl SpeechToText for FailingStt {
    async fn open(
        &self,
        _source_language: Language,
        _options: &SttOptions,
    ) -> CoreResult<(
        mpsc::Sender<AudioFrame>,
        Pin<Box<dyn Stream<Item = CoreResult<SttResult>> + Send>>,
    )> {
        Err(CoreError::permanent("no credentials configured"))
    }

    fn supported_languages(&self) -> &[Language] {
        &[]
    }

    fn provider_name(&self) -> &str {
        "failing-stt"
    }
}

struct UppercaseTranslator;

#[async_trait]
impl Translator for UppercaseTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        _target: Language,
        _preferences: Preferences,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> CoreResult<String> {
        Ok(text.to_uppercase())
    }

    fn supports_pair(&self, _source: Language, _target: Language) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "uppercase"
    }
}

struct CountingTts {
    synthesized: Arc<AtomicU64>,
}

#[async_trait]
impl TextToSpeech for CountingTts {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceAvatar,
        sink: mpsc::Sender<AudioFrame>,
    ) -> CoreResult<TtsHandle> {
        let synthesized = self.synthesized.clone();
        let (cancel_tx, mut cancel_rx) = tokio::sync::oneshot::channel();
        let join = tokio::spawn(async move {
            tokio::select! {
                _ = &mut cancel_rx => {}
                _ = sink.send(AudioFrame::new(vec![0.0; 320], SampleRate::Hz22050, Channels::Mono, 0)) => {
                    synthesized.fetch_add(1, Ordering::SeqCst);
                }
            }
            Ok(())
        });
        Ok(TtsHandle::new(cancel_tx, join))
    }

    fn provider_name(&self) -> &str {
        "counting-tts"
    }
}

/// Always rejects the chosen voice; used to exercise §8 scenario 6.
struct VoiceUnavailableTts;

#[async_trait]
impl TextToSpeech for VoiceUnavailableTts {
    async fn synthesize(
        &self,
        _text: &str,
        voice: &VoiceAvatar,
        _sink: mpsc::Sender<AudioFrame>,
    ) -> CoreResult<TtsHandle> {
        Err(interlingo_core::ProviderErrorKind::VoiceUnavailable(voice.voice_id.clone()).into())
    }

    fn provider_name(&self) -> &str {
        "voice-unavailable-tts"
    }
}

fn participants() -> PipelineParticipants {
    PipelineParticipants {
        speaker_identity: "speaker-1".into(),
        source_language: Language::En,
        listener_identity: "listener-1".into(),
        target_language: Language::Es,
        listener_voice: voice(),
        preferences: Preferences::default(),
    }
}

#[tokio::test]
async fn happy_path_runs_audio_through_stt_buffer_and_tts() {
    let synthesized = Arc::new(AtomicU64::new(0));
    let (audio_in_tx, audio_in_rx) = mpsc::channel(8);
    let (audio_out_tx, mut audio_out_rx) = mpsc::channel(8);
    let (events_tx, mut events_rx) = mpsc::channel(8);

    let handle = spawn(
        participants(),
        PipelineConfig::default(),
        Arc::new(FakeStt),
        Arc::new(UppercaseTranslator),
        Arc::new(CountingTts {
            synthesized: synthesized.clone(),
        }),
        audio_in_rx,
        audio_out_tx,
        events_tx,
    );

    audio_in_tx.send(frame(1)).await.unwrap();

    let produced = tokio::time::timeout(Duration::from_secs(2), audio_out_rx.recv())
        .await
        .expect("pipeline should emit translated audio before timing out");
    assert!(produced.is_some());
    assert_eq!(synthesized.load(Ordering::SeqCst), 1);

    drop(audio_in_tx);
    handle.request_drain();
    let event = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
        .await
        .expect("expected a terminal pipeline event");
    assert!(matches!(event, Some(PipelineEvent::Terminated)));
}

#[tokio::test]
async fn persistent_stt_failure_fails_the_pipeline_without_retry() {
    let (_audio_in_tx, audio_in_rx) = mpsc::channel(8);
    let (audio_out_tx, _audio_out_rx) = mpsc::channel(8);
    let (events_tx, mut events_rx) = mpsc::channel(8);

    let handle = spawn(
        participants(),
        PipelineConfig::default(),
        Arc::new(FailingStt),
        Arc::new(UppercaseTranslator),
        Arc::new(CountingTts {
            synthesized: Arc::new(AtomicU64::new(0)),
        }),
        audio_in_rx,
        audio_out_tx,
        events_tx,
    );

    let first = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
        .await
        .expect("expected a failure event");
    assert!(matches!(first, Some(PipelineEvent::Failed { .. })));

    let second = events_rx.recv().await;
    assert!(matches!(second, Some(PipelineEvent::Terminated)));
    assert_eq!(handle.state(), PipelineState::Terminated);
}

#[tokio::test]
async fn voice_unavailable_fails_the_pipeline_and_emits_no_audio() {
    let (audio_in_tx, audio_in_rx) = mpsc::channel(8);
    let (audio_out_tx, mut audio_out_rx) = mpsc::channel(8);
    let (events_tx, mut events_rx) = mpsc::channel(8);

    let handle = spawn(
        participants(),
        PipelineConfig::default(),
        Arc::new(FakeStt),
        Arc::new(UppercaseTranslator),
        Arc::new(VoiceUnavailableTts),
        audio_in_rx,
        audio_out_tx,
        events_tx,
    );

    audio_in_tx.send(frame(1)).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
        .await
        .expect("expected a failure event");
    assert!(matches!(first, Some(PipelineEvent::Failed { .. })));

    let second = events_rx.recv().await;
    assert!(matches!(second, Some(PipelineEvent::Terminated)));
    assert_eq!(handle.state(), PipelineState::Terminated);
    assert!(audio_out_rx.try_recv().is_err(), "no translated audio should reach the listener");
}

#[tokio::test]
async fn requesting_drain_before_any_audio_terminates_cleanly() {
    let (_audio_in_tx, audio_in_rx) = mpsc::channel(8);
    let (audio_out_tx, _audio_out_rx) = mpsc::channel(8);
    let (events_tx, mut events_rx) = mpsc::channel(8);

    let handle = spawn(
        participants(),
        PipelineConfig::default(),
        Arc::new(FakeStt),
        Arc::new(UppercaseTranslator),
        Arc::new(CountingTts {
            synthesized: Arc::new(AtomicU64::new(0)),
        }),
        audio_in_rx,
        audio_out_tx,
        events_tx,
    );

    handle.request_drain();
    let event = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
        .await
        .expect("expected a terminal event after drain");
    assert!(matches!(event, Some(PipelineEvent::Terminated)));
}
