//! Wires the concrete HTTP-based provider adapters (§4.1, `interlingo-providers`)
//! behind the Coordinator's object-safe `ProviderFactory` boundary.
//!
//! One client per capability is built once at startup and shared across
//! every (source, target) pair and every voice — the remote services are
//! expected to be single multi-tenant endpoints, not one per language.

use std::sync::Arc;

use interlingo_config::ProvidersConfig;
use interlingo_core::{Language, Result as CoreResult, SpeechToText, TextToSpeech, Translator, VoiceAvatar};
use interlingo_coordinator::ProviderFactory;
use interlingo_providers::{HttpSttConfig, HttpSttProvider, HttpTranslator, HttpTranslatorConfig, HttpTtsConfig, HttpTtsProvider};

const SUPPORTED_LANGUAGES: [Language; 6] =
    [Language::En, Language::Es, Language::Fr, Language::Yo, Language::Ha, Language::Ig];

pub struct HttpProviderFactory {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    tts: Arc<dyn TextToSpeech>,
}

impl HttpProviderFactory {
    pub fn new(config: &ProvidersConfig) -> CoreResult<Self> {
        let stt = HttpSttProvider::new(
            HttpSttConfig {
                base_url: config.stt_base_url.clone(),
                timeout_ms: config.timeout_ms,
                ..HttpSttConfig::default()
            },
            SUPPORTED_LANGUAGES.to_vec(),
        )?;

        let mut supported_pairs = Vec::new();
        for source in SUPPORTED_LANGUAGES {
            for target in SUPPORTED_LANGUAGES {
                if source != target {
                    supported_pairs.push((source, target));
                }
            }
        }
        let translator = HttpTranslator::new(HttpTranslatorConfig {
            base_url: config.translator_base_url.clone(),
            timeout_ms: config.timeout_ms,
            supported_pairs,
        })?;

        let tts = HttpTtsProvider::new(HttpTtsConfig {
            base_url: config.tts_base_url.clone(),
            timeout_ms: config.timeout_ms,
            ..HttpTtsConfig::default()
        })?;

        Ok(Self { stt: Arc::new(stt), translator: Arc::new(translator), tts: Arc::new(tts) })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build_stt(&self, _source_language: Language) -> Arc<dyn SpeechToText> {
        self.stt.clone()
    }

    fn build_translator(&self, _source_language: Language, _target_language: Language) -> Arc<dyn Translator> {
        self.translator.clone()
    }

    fn build_tts(&self, _voice: &VoiceAvatar) -> Arc<dyn TextToSpeech> {
        self.tts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_from_defaults_and_shares_one_client_per_capability() {
        let config = ProvidersConfig::default();
        let factory = HttpProviderFactory::new(&config).expect("default config must build");

        let a = factory.build_stt(Language::En);
        let b = factory.build_stt(Language::Fr);
        assert!(Arc::ptr_eq(&a, &b));

        let t1 = factory.build_translator(Language::En, Language::Es);
        let t2 = factory.build_translator(Language::Fr, Language::Yo);
        assert!(Arc::ptr_eq(&t1, &t2));
    }
}
