//! Streaming text-to-speech contract (§4.1).

use crate::audio::AudioFrame;
use crate::avatar::VoiceAvatar;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A cancellable in-flight synthesis. `cancel()` stops emission and drops
/// any buffered output (§4.1); dropping the handle without calling it lets
/// synthesis run to completion.
pub struct TtsHandle {
    cancel_tx: Option<tokio::sync::oneshot::Sender<()>>,
    pub join: tokio::task::JoinHandle<Result<()>>,
}

impl TtsHandle {
    pub fn new(cancel_tx: tokio::sync::oneshot::Sender<()>, join: tokio::task::JoinHandle<Result<()>>) -> Self {
        Self { cancel_tx: Some(cancel_tx), join }
    }

    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize `text` with `voice`, writing audio frames into `sink` in
    /// order. Returns a handle the caller can cancel.
    async fn synthesize(&self, text: &str, voice: &VoiceAvatar, sink: mpsc::Sender<AudioFrame>) -> Result<TtsHandle>;

    fn provider_name(&self) -> &str;
}
