//! Builds the provider trait objects a Pipeline needs for one
//! (source_language, target_language, voice) combination. Mirrors the
//! factory-function shape of `text_processing::translation::create_translator`
//! / `create_fallback_translator`, generalized to all three capability sets
//! and made object-safe so a `RoomCoordinator` can hold one without knowing
//! which concrete adapters it builds.

use interlingo_core::{Language, SpeechToText, TextToSpeech, Translator, VoiceAvatar};
use std::sync::Arc;

pub trait ProviderFactory: Send + Sync + 'static {
    fn build_stt(&self, source_language: Language) -> Arc<dyn SpeechToText>;
    fn build_translator(&self, source_language: Language, target_language: Language) -> Arc<dyn Translator>;
    fn build_tts(&self, voice: &VoiceAvatar) -> Arc<dyn TextToSpeech>;
}
