//! Remote text-to-speech provider streaming audio chunks over HTTP (§4.1).

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use interlingo_core::{
    AudioFrame, Channels, CoreError, Result as CoreResult, SampleRate, TextToSpeech, TtsHandle,
    VoiceAvatar,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::ProviderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTtsConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub output_sample_rate: SampleRate,
}

impl Default for HttpTtsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8092".to_string(),
            timeout_ms: 10_000,
            output_sample_rate: SampleRate::Hz22050,
        }
    }
}

pub struct HttpTtsProvider {
    client: reqwest::Client,
    config: HttpTtsConfig,
}

impl HttpTtsProvider {
    pub fn new(config: HttpTtsConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|source| {
                CoreError::from(ProviderError::Transport {
                    provider: "http-tts",
                    source,
                })
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextToSpeech for HttpTtsProvider {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceAvatar,
        sink: mpsc::Sender<AudioFrame>,
    ) -> CoreResult<TtsHandle> {
        let url = format!("{}/synthesize", self.config.base_url);
        let request = self
            .client
            .post(&url)
            .query(&[("voice_id", voice.voice_id.as_str())])
            .body(text.to_string());

        let response = request.send().await.map_err(|source| {
            CoreError::from(ProviderError::Transport {
                provider: "http-tts",
                source,
            })
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::from(ProviderError::Rejected {
                provider: "http-tts",
                status,
                body,
            }));
        }

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let sample_rate = self.config.output_sample_rate;

        let join = tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut sequence = 0u64;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => {
                        return Ok(());
                    }
                    chunk = byte_stream.next() => {
                        match chunk {
                            Some(Ok(bytes)) => {
                                let frame = AudioFrame::from_pcm16(&bytes, sample_rate, Channels::Mono, sequence);
                                sequence += 1;
                                if sink.send(frame).await.is_err() {
                                    return Ok(());
                                }
                            }
                            Some(Err(source)) => {
                                return Err(CoreError::from(ProviderError::Transport {
                                    provider: "http-tts",
                                    source,
                                }));
                            }
                            None => return Ok(()),
                        }
                    }
                }
            }
        });

        Ok(TtsHandle::new(cancel_tx, join))
    }

    fn provider_name(&self) -> &str {
        "http-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_rate_matches_tts_convention() {
        let config = HttpTtsConfig::default();
        assert_eq!(config.output_sample_rate, SampleRate::Hz22050);
    }
}
