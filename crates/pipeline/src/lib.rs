//! Per-(listener, speaker) pipeline (§4.3): three cooperative tasks — STT
//! reader, buffer/translator worker, TTS writer — connected by two bounded
//! queues, driven by the state machine in [`state`].

pub mod retry;
pub mod state;

use std::sync::Arc;

use interlingo_buffer::{BufferPolicy, TranslatedSegment, TranslationBuffer};
use interlingo_core::{
    AudioFrame, CoreError, Language, Preferences, Result as CoreResult, SpeechToText, SttOptions,
    TextToSpeech, Translator, VoiceAvatar,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub use state::PipelineState;

/// Structured events the pipeline reports to whatever owns it (the Room
/// Coordinator) so it can update room/control-channel state without polling
/// the pipeline directly (§4.3, §4.5).
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Failed { reason: String },
    Terminated,
}

/// Everything identifying the two ends of a pipeline, captured once at
/// construction time and never re-read (§3 snapshot invariant — the caller
/// is responsible for passing an already-snapshotted `UserProfile`'s
/// fields in here, not a live handle into the Profile Cache).
pub struct PipelineParticipants {
    pub speaker_identity: String,
    pub source_language: Language,
    pub listener_identity: String,
    pub target_language: Language,
    pub listener_voice: VoiceAvatar,
    pub preferences: Preferences,
}

pub struct PipelineHandle {
    state: Arc<Mutex<PipelineState>>,
    drain: tokio_drain::DrainSignal,
}

impl PipelineHandle {
    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Requests an orderly shutdown (§4.3 `draining`): in-flight segments
    /// whose deadline has not passed are still flushed before teardown.
    pub fn request_drain(&self) {
        self.drain.signal();
    }
}

/// A tiny drain-signal primitive so the pipeline crate doesn't need to pull
/// in `tokio_util::sync::CancellationToken` just for one boolean flag;
/// avoids the extra dependency the buffer/providers crates already carry.
mod tokio_drain {
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Clone)]
    pub struct DrainSignal(Arc<Notify>);

    impl DrainSignal {
        pub fn new() -> (Self, Self) {
            let notify = Arc::new(Notify::new());
            (Self(notify.clone()), Self(notify))
        }

        pub fn signal(&self) {
            self.0.notify_waiters();
        }

        pub async fn wait(&self) {
            self.0.notified().await;
        }
    }
}

pub struct PipelineConfig {
    pub buffer_policy: BufferPolicy,
    pub stt_options: SttOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_policy: BufferPolicy::default(),
            stt_options: SttOptions::default(),
        }
    }
}

/// Spawns the pipeline's tasks and returns a handle immediately; the
/// pipeline itself runs in the background and reports terminal state
/// changes through `events`.
pub fn spawn(
    participants: PipelineParticipants,
    config: PipelineConfig,
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    tts: Arc<dyn TextToSpeech>,
    mut audio_in: mpsc::Receiver<AudioFrame>,
    audio_out: mpsc::Sender<AudioFrame>,
    events: mpsc::Sender<PipelineEvent>,
) -> PipelineHandle {
    let state = Arc::new(Mutex::new(PipelineState::Initializing));
    let (drain_tx, drain_rx) = tokio_drain::DrainSignal::new();

    let handle = PipelineHandle {
        state: state.clone(),
        drain: drain_tx,
    };

    tokio::spawn(async move {
        let outcome = run(
            participants,
            config,
            stt,
            translator,
            tts,
            &mut audio_in,
            audio_out,
            &state,
            drain_rx,
        )
        .await;

        match outcome {
            Ok(()) => {
                *state.lock() = PipelineState::Terminated;
            }
            Err(err) => {
                *state.lock() = PipelineState::Failed;
                let _ = events
                    .send(PipelineEvent::Failed {
                        reason: err.to_string(),
                    })
                    .await;
                *state.lock() = PipelineState::Terminated;
                let _ = events.send(PipelineEvent::Terminated).await;
                return;
            }
        }
        let _ = events.send(PipelineEvent::Terminated).await;
    });

    handle
}

#[allow(clippy::too_many_arguments)]
async fn run(
    participants: PipelineParticipants,
    config: PipelineConfig,
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    tts: Arc<dyn TextToSpeech>,
    audio_in: &mut mpsc::Receiver<AudioFrame>,
    audio_out: mpsc::Sender<AudioFrame>,
    state: &Arc<Mutex<PipelineState>>,
    drain: tokio_drain::DrainSignal,
) -> CoreResult<()> {
    let source_language = participants.source_language;
    let target_language = participants.target_language;

    let (stt_frame_tx, mut stt_result_stream) = retry::with_retry(|| {
        let stt = stt.clone();
        let options = config.stt_options.clone();
        async move { stt.open(source_language, &options).await }
    })
    .await?;

    *state.lock() = PipelineState::Running;

    let (buffer, mut buffer_out) = TranslationBuffer::new(
        config.buffer_policy,
        translator,
        source_language,
        target_language,
        participants.preferences,
    );

    let frame_forward = async {
        while let Some(frame) = audio_in.recv().await {
            if stt_frame_tx.send(frame).await.is_err() {
                break;
            }
        }
    };

    let stt_to_buffer = async {
        use futures::StreamExt;
        while let Some(result) = stt_result_stream.next().await {
            match result {
                Ok(hypothesis) => buffer.on_stt_result(hypothesis).await,
                Err(err) if err.is_retryable() => {
                    tracing::warn!(error = %err, "transient STT error, dropping hypothesis");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    };

    let voice = participants.listener_voice.clone();
    let tts_writer = async {
        while let Some(TranslatedSegment {
            segment_id,
            text,
            dropped,
        }) = buffer_out.recv().await
        {
            let Some(text) = text else {
                if dropped {
                    tracing::debug!(segment_id, "segment dropped, slot consumed");
                }
                continue;
            };
            match tts.synthesize(&text, &voice, audio_out.clone()).await {
                Ok(mut handle) => {
                    let outcome = (&mut handle.join)
                        .await
                        .unwrap_or_else(|_| Err(CoreError::invariant("TTS synthesis task panicked")));
                    if let Err(err) = outcome {
                        if err.is_retryable() {
                            tracing::warn!(segment_id, error = %err, "transient TTS error, dropping segment's audio");
                        } else {
                            return Err(err);
                        }
                    }
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(segment_id, error = %err, "transient TTS error, dropping segment's audio");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    };

    tokio::select! {
        _ = drain.wait() => {
            *state.lock() = PipelineState::Draining;
            Ok(())
        }
        result = stt_to_buffer => result,
        _ = frame_forward => Ok(()),
        result = tts_writer => result,
    }
}
