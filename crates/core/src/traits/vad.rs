//! Voice activity detection, used to wrap non-streaming STT backends with
//! utterance boundaries (§4.1, open question in SPEC_FULL.md §9).

use crate::audio::AudioFrame;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct VadConfig {
    pub threshold: f32,
    pub min_speech_duration_ms: u32,
    pub min_silence_duration_ms: u32,
    pub energy_floor_db: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_speech_duration_ms: 256,
            min_silence_duration_ms: 320,
            energy_floor_db: -50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEvent {
    SpeechStart,
    SpeechContinue,
    SpeechEnd,
    Silence,
}

/// Default implementation: energy-threshold based, matching the spec's
/// silence on which VAD model to select. Real deployments may swap this for
/// a neural VAD without changing the trait.
#[async_trait]
pub trait VoiceActivityDetector: Send + Sync + 'static {
    async fn speech_probability(&self, audio: &AudioFrame) -> f32;
    fn reset(&self);
    fn model_info(&self) -> &str;
}

#[derive(Clone)]
pub struct EnergyVad {
    config: VadConfig,
}

impl EnergyVad {
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl VoiceActivityDetector for EnergyVad {
    async fn speech_probability(&self, audio: &AudioFrame) -> f32 {
        if audio.is_likely_silence(self.config.energy_floor_db) {
            0.0
        } else {
            1.0
        }
    }

    fn reset(&self) {}

    fn model_info(&self) -> &str {
        "energy-threshold-vad"
    }
}
