//! Remote text translation provider (§4.1) and a primary/fallback
//! composition used when a preferred translator is flaky.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use interlingo_core::{CoreError, Language, Preferences, Result as CoreResult, Translator};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTranslatorConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub supported_pairs: Vec<(Language, Language)>,
}

impl Default for HttpTranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8091".to_string(),
            timeout_ms: 2_000,
            supported_pairs: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
    formal_tone: bool,
    preserve_emotion: bool,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

pub struct HttpTranslator {
    client: reqwest::Client,
    config: HttpTranslatorConfig,
}

impl HttpTranslator {
    pub fn new(config: HttpTranslatorConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|source| {
                CoreError::from(ProviderError::Transport {
                    provider: "http-translator",
                    source,
                })
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
        preferences: Preferences,
        cancel: CancellationToken,
    ) -> CoreResult<String> {
        if !self.supports_pair(source, target) {
            return Err(CoreError::from(ProviderError::UnsupportedLanguagePair {
                provider: "http-translator",
                from: source.code().to_string(),
                to: target.code().to_string(),
            }));
        }

        let url = format!("{}/translate", self.config.base_url);
        let body = TranslateRequest {
            text,
            source: source.code(),
            target: target.code(),
            formal_tone: preferences.formal_tone,
            preserve_emotion: preferences.preserve_emotion,
        };

        let request = self.client.post(&url).json(&body).send();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                Err(CoreError::from(ProviderError::StreamClosed { provider: "http-translator" }))
            }
            result = request => {
                let resp = result.map_err(|source| ProviderError::Transport {
                    provider: "http-translator",
                    source,
                })?;
                if !resp.status().is_success() {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(CoreError::from(ProviderError::Rejected {
                        provider: "http-translator",
                        status,
                        body,
                    }));
                }
                let parsed: TranslateResponse = resp.json().await.map_err(|source| {
                    ProviderError::Transport { provider: "http-translator", source }
                })?;
                Ok(parsed.text)
            }
        }
    }

    fn supports_pair(&self, source: Language, target: Language) -> bool {
        self.config.supported_pairs.contains(&(source, target))
    }

    fn provider_name(&self) -> &str {
        "http-translator"
    }
}

/// Tries `primary` first; on any error from `primary`, retries once through
/// `fallback` with the same cancellation token (§4.1, §7 — transient
/// provider errors are retried, not surfaced to the caller directly).
pub struct FallbackTranslator {
    primary: Arc<dyn Translator>,
    fallback: Arc<dyn Translator>,
}

impl FallbackTranslator {
    pub fn new(primary: Arc<dyn Translator>, fallback: Arc<dyn Translator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Translator for FallbackTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
        preferences: Preferences,
        cancel: CancellationToken,
    ) -> CoreResult<String> {
        match self
            .primary
            .translate(text, source, target, preferences.clone(), cancel.clone())
            .await
        {
            Ok(translated) => Ok(translated),
            Err(err) if cancel.is_cancelled() => Err(err),
            Err(err) => {
                tracing::warn!(
                    provider = self.primary.provider_name(),
                    error = %err,
                    "primary translator failed, retrying through fallback"
                );
                self.fallback
                    .translate(text, source, target, preferences, cancel)
                    .await
            }
        }
    }

    fn supports_pair(&self, source: Language, target: Language) -> bool {
        self.primary.supports_pair(source, target) || self.fallback.supports_pair(source, target)
    }

    fn provider_name(&self) -> &str {
        "fallback-translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_pairs_until_configured() {
        let config = HttpTranslatorConfig::default();
        assert!(config.supported_pairs.is_empty());
    }
}
