//! Remote provider adapters implementing the core STT/Translator/TTS traits
//! (§4.1): streaming byte-in/text-out or text-in/audio-out HTTP services,
//! plus a VAD-wrapped batch STT adapter for non-streaming backends and a
//! primary/fallback translator composition.

pub mod error;
pub mod http_stt;
pub mod http_translator;
pub mod http_tts;
pub mod vad_batch_stt;

pub use error::ProviderError;
pub use http_stt::{HttpSttConfig, HttpSttProvider};
pub use http_translator::{FallbackTranslator, HttpTranslator, HttpTranslatorConfig};
pub use http_tts::{HttpTtsConfig, HttpTtsProvider};
pub use vad_batch_stt::VadWrappedStt;
