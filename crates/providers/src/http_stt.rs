//! Remote speech-to-text provider talking PCM16 over HTTP (§4.1).
//!
//! Audio frames are buffered until `buffer_ms` worth of samples have
//! accumulated, then POSTed to the backing service. Interim and final
//! results come back as JSON and are forwarded onto the result stream
//! as they arrive, independent of how fast new audio frames are pushed.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use interlingo_core::{
    AudioFrame, CoreError, Language, Result as CoreResult, SpeechToText, SttOptions, SttResult,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ProviderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSttConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub buffer_ms: u64,
    pub sample_rate_hz: u32,
}

impl Default for HttpSttConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            timeout_ms: 10_000,
            buffer_ms: 300,
            sample_rate_hz: 16_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranscribeRequest {
    language: String,
    is_final: bool,
    sample_rate_hz: u32,
    pcm16: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
    confidence: f32,
}

fn pcm16_of(samples: &[f32]) -> Vec<u8> {
    const PCM16_SCALE: f32 = 32767.0;
    samples
        .iter()
        .map(|&sample| ((sample.clamp(-1.0, 1.0)) * PCM16_SCALE) as i16)
        .flat_map(|s: i16| s.to_le_bytes())
        .collect()
}

pub struct HttpSttProvider {
    client: reqwest::Client,
    config: HttpSttConfig,
    supported: Vec<Language>,
}

impl HttpSttProvider {
    pub fn new(config: HttpSttConfig, supported: Vec<Language>) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|source| {
                CoreError::from(ProviderError::Transport {
                    provider: "http-stt",
                    source,
                })
            })?;
        Ok(Self {
            client,
            config,
            supported,
        })
    }

    async fn transcribe_chunk(
        client: &reqwest::Client,
        base_url: &str,
        language: Language,
        sample_rate_hz: u32,
        pcm16: Vec<u8>,
        is_final: bool,
    ) -> Result<TranscribeResponse, ProviderError> {
        let url = format!("{base_url}/transcribe");
        let body = TranscribeRequest {
            language: language.code().to_string(),
            is_final,
            sample_rate_hz,
            pcm16,
        };

        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: "http-stt",
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                provider: "http-stt",
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: "http-stt",
                source,
            })
    }
}

#[async_trait]
impl SpeechToText for HttpSttProvider {
    async fn open(
        &self,
        source_language: Language,
        options: &SttOptions,
    ) -> CoreResult<(
        mpsc::Sender<AudioFrame>,
        Pin<Box<dyn Stream<Item = CoreResult<SttResult>> + Send>>,
    )> {
        if !self.supports_language(source_language) {
            return Err(CoreError::from(ProviderError::UnsupportedLanguagePair {
                provider: "http-stt",
                from: source_language.code().to_string(),
                to: "text".to_string(),
            }));
        }

        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(32);
        let (result_tx, result_rx) = mpsc::channel::<CoreResult<SttResult>>(32);

        let client = self.client.clone();
        let base_url = self.config.base_url.clone();
        let sample_rate_hz = self.config.sample_rate_hz;
        let buffer_ms = self.config.buffer_ms;
        let buffer_samples = (sample_rate_hz as u64 * buffer_ms / 1000).max(1) as usize;
        let interim = options.interim_results;

        tokio::spawn(async move {
            let mut buffer: Vec<f32> = Vec::with_capacity(buffer_samples * 2);
            let mut segment_id = 0u64;
            let mut ts_cursor_ms: u64 = 0;

            while let Some(frame) = frame_rx.recv().await {
                buffer.extend_from_slice(&frame.samples);
                ts_cursor_ms += frame.duration_ms();

                if interim && buffer.len() >= buffer_samples {
                    let pcm16 = pcm16_of(&buffer);
                    match HttpSttProvider::transcribe_chunk(
                        &client,
                        &base_url,
                        source_language,
                        sample_rate_hz,
                        pcm16,
                        false,
                    )
                    .await
                    {
                        Ok(resp) if !resp.text.is_empty() => {
                            let result = SttResult {
                                segment_id,
                                text: resp.text,
                                is_final: false,
                                confidence: resp.confidence,
                                ts_start_ms: ts_cursor_ms.saturating_sub(buffer_ms),
                                ts_end_ms: ts_cursor_ms,
                            };
                            if result_tx.send(Ok(result)).await.is_err() {
                                return;
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(error = %err, "interim transcription failed");
                            if result_tx.send(Err(err.into())).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }

            if !buffer.is_empty() {
                let pcm16 = pcm16_of(&buffer);
                match HttpSttProvider::transcribe_chunk(
                    &client,
                    &base_url,
                    source_language,
                    sample_rate_hz,
                    pcm16,
                    true,
                )
                .await
                {
                    Ok(resp) => {
                        let result = SttResult {
                            segment_id,
                            text: resp.text,
                            is_final: true,
                            confidence: resp.confidence,
                            ts_start_ms: 0,
                            ts_end_ms: ts_cursor_ms,
                        };
                        segment_id += 1;
                        let _ = result_tx.send(Ok(result)).await;
                    }
                    Err(err) => {
                        let _ = result_tx.send(Err(err.into())).await;
                    }
                }
            }
            let _ = segment_id;
        });

        let stream = tokio_stream::wrappers::ReceiverStream::new(result_rx);
        Ok((frame_tx, Box::pin(stream)))
    }

    fn supported_languages(&self) -> &[Language] {
        &self.supported
    }

    fn provider_name(&self) -> &str {
        "http-stt"
    }
}

pub fn shared(provider: HttpSttProvider) -> Arc<dyn SpeechToText> {
    Arc::new(provider)
}
