//! Streaming speech-to-text contract (§4.1).

use crate::audio::AudioFrame;
use crate::error::Result;
use crate::language::Language;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// One hypothesis emitted by an STT stream.
#[derive(Debug, Clone, Default)]
pub struct SttResult {
    pub segment_id: u64,
    pub text: String,
    pub is_final: bool,
    pub confidence: f32,
    pub ts_start_ms: u64,
    pub ts_end_ms: u64,
}

/// Knobs the spec requires every streaming STT implementer to honor
/// (§4.1): interim results on, punctuation/smart-formatting/profanity
/// filter off, a bounded utterance-end window, language supplied by the
/// caller rather than auto-detected.
#[derive(Debug, Clone)]
pub struct SttOptions {
    pub interim_results: bool,
    pub punctuation: bool,
    pub smart_formatting: bool,
    pub profanity_filter: bool,
    pub utterance_end_window_ms: u64,
}

impl Default for SttOptions {
    fn default() -> Self {
        Self {
            interim_results: true,
            punctuation: false,
            smart_formatting: false,
            profanity_filter: false,
            utterance_end_window_ms: 500,
        }
    }
}

/// `open(source_language, audio_sink) → stream` from §4.1. The concrete
/// shape here is a push/pull pair: the caller feeds frames through the
/// returned sink and reads hypotheses off the returned stream, rather than
/// a single bidirectional object, so a pipeline's STT-reader task can own
/// each half independently.
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Open a streaming session for one speaker's audio in `source_language`.
    /// Returns a frame sink and a hypothesis stream bound to that session.
    async fn open(
        &self,
        source_language: Language,
        options: &SttOptions,
    ) -> Result<(tokio::sync::mpsc::Sender<AudioFrame>, Pin<Box<dyn Stream<Item = Result<SttResult>> + Send>>)>;

    fn supported_languages(&self) -> &[Language];

    fn provider_name(&self) -> &str;

    fn supports_language(&self, lang: Language) -> bool {
        self.supported_languages().contains(&lang)
    }
}

/// A non-streaming STT backend wrapped with a VAD so it can still emit
/// utterance boundaries — the only way the spec allows non-streaming
/// backends to participate (§4.1, open question in SPEC_FULL.md §9).
#[async_trait]
pub trait BatchSpeechToText: Send + Sync + 'static {
    async fn transcribe(&self, audio: &AudioFrame, language: Language) -> Result<SttResult>;
    fn provider_name(&self) -> &str;
}
