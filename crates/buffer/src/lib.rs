//! Per-pipeline translation buffer (§4.2): decides when to translate, keeps
//! segments in strict speaking order, and enforces the latency ceiling.

pub mod policy;
pub mod segment_map;
pub mod stats;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use interlingo_core::{Language, Preferences, Result as CoreResult, Segment, SegmentStatus, SttResult, Translator};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

pub use policy::BufferPolicy;
pub use stats::BufferStats;

use segment_map::SegmentMap;
use stats::StatsAccumulator;

/// A translated segment ready to hand to the TTS writer, emitted in strict
/// `first_seen_at` order; `dropped` segments still consume their ordering
/// slot but carry no text to speak.
#[derive(Debug, Clone)]
pub struct TranslatedSegment {
    pub segment_id: u64,
    pub text: Option<String>,
    pub dropped: bool,
}

struct Inner {
    segments: SegmentMap,
    last_interim_words: HashMap<u64, String>,
    in_flight: HashMap<u64, CancellationToken>,
    stats: StatsAccumulator,
}

pub struct TranslationBuffer {
    policy: BufferPolicy,
    translator: Arc<dyn Translator>,
    source: Language,
    target: Language,
    preferences: Preferences,
    inner: Arc<Mutex<Inner>>,
    output_tx: mpsc::Sender<TranslatedSegment>,
    notify: Arc<Notify>,
}

impl TranslationBuffer {
    pub fn new(
        policy: BufferPolicy,
        translator: Arc<dyn Translator>,
        source: Language,
        target: Language,
        preferences: Preferences,
    ) -> (Self, mpsc::Receiver<TranslatedSegment>) {
        let (output_tx, output_rx) = mpsc::channel(32);
        let inner = Arc::new(Mutex::new(Inner {
            segments: SegmentMap::default(),
            last_interim_words: HashMap::new(),
            in_flight: HashMap::new(),
            stats: StatsAccumulator::default(),
        }));
        let notify = Arc::new(Notify::new());

        let buffer = Self {
            policy,
            translator,
            source,
            target,
            preferences,
            inner: inner.clone(),
            output_tx: output_tx.clone(),
            notify: notify.clone(),
        };

        tokio::spawn(run_emitter(
            policy,
            inner,
            output_tx,
            notify,
        ));

        (buffer, output_rx)
    }

    pub fn stats(&self) -> BufferStats {
        let inner = self.inner.lock();
        inner.stats.snapshot(inner.segments.len())
    }

    /// Feed one STT hypothesis into the buffer (§4.2 policy).
    pub async fn on_stt_result(&self, result: SttResult) {
        let now = chrono::Utc::now();
        let segment_id = result.segment_id;

        let existing_age_ms = {
            let mut inner = self.inner.lock();
            let entry = inner
                .segments
                .get(segment_id)
                .map(|s| s.first_seen_at)
                .unwrap_or(now);
            if inner.segments.get(segment_id).is_none() {
                inner.segments.insert(Segment::new(
                    segment_id,
                    String::new(),
                    result.text.clone(),
                ));
            }
            (now - entry).num_milliseconds().max(0) as u64
        };

        if result.is_final {
            self.trigger_translation(segment_id, result.text, true).await;
            return;
        }

        let material_delta = {
            let mut inner = self.inner.lock();
            let previous = inner
                .last_interim_words
                .get(&segment_id)
                .cloned()
                .unwrap_or_default();
            let delta = policy::word_delta(&previous, &result.text);
            inner
                .last_interim_words
                .insert(segment_id, result.text.clone());
            delta
        };

        if self
            .policy
            .should_trigger_interim(existing_age_ms, material_delta)
        {
            self.trigger_translation(segment_id, result.text, false).await;
        }
    }

    async fn trigger_translation(&self, segment_id: u64, text: String, is_final: bool) {
        let cancel = CancellationToken::new();
        let previous_cancel = {
            let mut inner = self.inner.lock();
            if let Some(segment) = inner.segments.get_mut(segment_id) {
                if is_final {
                    segment.final_text = Some(text.clone());
                    segment.finalized_at = Some(chrono::Utc::now());
                }
                segment.status = SegmentStatus::Translating;
            }
            inner.in_flight.insert(segment_id, cancel.clone())
        };
        // Superseding a provisional translation: cancel it before starting
        // the one built from the final text (§4.2).
        if let Some(previous) = previous_cancel {
            previous.cancel();
        }

        let translator = self.translator.clone();
        let source = self.source;
        let target = self.target;
        let preferences = self.preferences;
        let inner = self.inner.clone();
        let policy = self.policy;
        let notify = self.notify.clone();

        let started_at = chrono::Utc::now();
        tokio::spawn(async move {
            let result: CoreResult<String> = translator
                .translate(&text, source, target, preferences, cancel.clone())
                .await;

            if cancel.is_cancelled() {
                return;
            }

            let mut guard = inner.lock();
            guard.in_flight.remove(&segment_id);
            match result {
                Ok(translated) => {
                    if let Some(segment) = guard.segments.get_mut(segment_id) {
                        let now = chrono::Utc::now();
                        if segment.is_past_deadline(policy.max_delay_ms, now) {
                            segment.status = SegmentStatus::Dropped;
                            guard.stats.record_dropped();
                        } else {
                            segment.translated_text = Some(translated);
                            segment.translation_started_at = Some(started_at);
                            segment.completed_at = Some(now);
                            if is_final {
                                segment.status = SegmentStatus::Spoken;
                            }
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(segment_id, error = %err, "segment translation failed");
                    if let Some(segment) = guard.segments.get_mut(segment_id) {
                        segment.status = SegmentStatus::Dropped;
                    }
                    guard.stats.record_failed();
                }
            }
            drop(guard);
            notify.notify_one();
        });
    }
}

/// Walks the segment map in order, emitting each head segment once it is
/// either translated or past its deadline, and applies backpressure by
/// dropping the oldest unspoken segment if the sink does not accept within
/// `max_delay_ms` (§4.2).
async fn run_emitter(
    policy: BufferPolicy,
    inner: Arc<Mutex<Inner>>,
    output_tx: mpsc::Sender<TranslatedSegment>,
    notify: Arc<Notify>,
) {
    loop {
        let ready = {
            let guard = inner.lock();
            guard.segments.head().map(|segment| {
                let now = chrono::Utc::now();
                let past_deadline = segment.is_past_deadline(policy.max_delay_ms, now);
                let has_result = segment.translated_text.is_some()
                    && matches!(segment.status, SegmentStatus::Spoken | SegmentStatus::Dropped);
                (segment.segment_id, has_result, past_deadline)
            })
        };

        match ready {
            Some((segment_id, true, _)) | Some((segment_id, _, true)) => {
                let segment = {
                    let mut guard = inner.lock();
                    guard.segments.remove_head()
                };
                let Some(segment) = segment else { continue };
                let dropped = segment.translated_text.is_none();
                let output = TranslatedSegment {
                    segment_id,
                    text: segment.translated_text,
                    dropped,
                };
                if !dropped {
                    let latency_ms = (chrono::Utc::now() - segment.first_seen_at)
                        .num_milliseconds()
                        .max(0) as u64;
                    inner.lock().stats.record_completed(latency_ms);
                } else {
                    inner.lock().stats.record_dropped();
                }

                let send = output_tx.send(output);
                match tokio::time::timeout(Duration::from_millis(policy.max_delay_ms), send).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => return, // receiver gone; emitter shuts down
                    Err(_) => {
                        tracing::warn!(segment_id, "TTS sink backpressured, dropping segment slot");
                    }
                }
            }
            Some((_, false, false)) | None => {
                let _ = tokio::time::timeout(Duration::from_millis(50), notify.notified()).await;
            }
        }
    }
}
