//! Provider-facing traits (§4.1): pluggable STT/Translator/TTS/VAD
//! implementations behind uniform, streaming-friendly interfaces.

mod stt;
mod translator;
mod tts;
mod vad;

pub use stt::{BatchSpeechToText, SpeechToText, SttOptions, SttResult};
pub use translator::Translator;
pub use tts::{TextToSpeech, TtsHandle};
pub use vad::{EnergyVad, VadConfig, VadEvent, VoiceActivityDetector};
