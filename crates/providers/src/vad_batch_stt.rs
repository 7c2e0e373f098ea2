//! Wraps a non-streaming STT backend with a VAD so it can still produce the
//! streaming contract the pipeline expects (§4.1 open question).

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use interlingo_core::{
    AudioFrame, BatchSpeechToText, EnergyVad, Language, Result as CoreResult, SpeechToText,
    SttOptions, SttResult, VadEvent, VoiceActivityDetector,
};
use tokio::sync::mpsc;

/// Accumulates frames while the VAD reports speech, flushes the batch
/// backend once it reports `SpeechEnd`, and turns each batch result into a
/// single final `SttResult`. No interim results are produced — non-streaming
/// backends cannot honor `SttOptions::interim_results`.
pub struct VadWrappedStt {
    backend: Arc<dyn BatchSpeechToText>,
    vad: EnergyVad,
    supported: Vec<Language>,
}

impl VadWrappedStt {
    pub fn new(backend: Arc<dyn BatchSpeechToText>, vad: EnergyVad, supported: Vec<Language>) -> Self {
        Self {
            backend,
            vad,
            supported,
        }
    }
}

#[async_trait]
impl SpeechToText for VadWrappedStt {
    async fn open(
        &self,
        source_language: Language,
        _options: &SttOptions,
    ) -> CoreResult<(
        mpsc::Sender<AudioFrame>,
        Pin<Box<dyn Stream<Item = CoreResult<SttResult>> + Send>>,
    )> {
        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(32);
        let (result_tx, result_rx) = mpsc::channel::<CoreResult<SttResult>>(8);

        let backend = self.backend.clone();
        let vad = self.vad.clone();

        tokio::spawn(async move {
            let mut utterance: Vec<AudioFrame> = Vec::new();
            let mut segment_id = 0u64;

            while let Some(frame) = frame_rx.recv().await {
                let probability = vad.speech_probability(&frame).await;
                let event = if probability > 0.5 {
                    VadEvent::SpeechContinue
                } else if utterance.is_empty() {
                    VadEvent::Silence
                } else {
                    VadEvent::SpeechEnd
                };

                match event {
                    VadEvent::SpeechEnd => {
                        if let Some(merged) = merge_frames(&utterance) {
                            match backend.transcribe(&merged, source_language).await {
                                Ok(mut result) => {
                                    result.segment_id = segment_id;
                                    result.is_final = true;
                                    segment_id += 1;
                                    if result_tx.send(Ok(result)).await.is_err() {
                                        return;
                                    }
                                }
                                Err(err) => {
                                    if result_tx.send(Err(err)).await.is_err() {
                                        return;
                                    }
                                }
                            }
                        }
                        utterance.clear();
                        vad.reset();
                    }
                    VadEvent::Silence => {}
                    _ => utterance.push(frame),
                }
            }

            if let Some(merged) = merge_frames(&utterance) {
                if let Ok(mut result) = backend.transcribe(&merged, source_language).await {
                    result.segment_id = segment_id;
                    result.is_final = true;
                    let _ = result_tx.send(Ok(result)).await;
                }
            }
        });

        let stream = tokio_stream::wrappers::ReceiverStream::new(result_rx);
        Ok((frame_tx, Box::pin(stream)))
    }

    fn supported_languages(&self) -> &[Language] {
        &self.supported
    }

    fn provider_name(&self) -> &str {
        self.backend.provider_name()
    }
}

fn merge_frames(frames: &[AudioFrame]) -> Option<AudioFrame> {
    if frames.is_empty() {
        return None;
    }
    let mut samples = Vec::new();
    for frame in frames {
        samples.extend_from_slice(&frame.samples);
    }
    Some(AudioFrame::new(
        samples,
        frames[0].sample_rate,
        frames[0].channels,
        frames[0].sequence,
    ))
}
