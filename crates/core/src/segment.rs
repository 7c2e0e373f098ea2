//! Segment: one contiguous utterance unit tracked from first STT interim to
//! TTS emission or drop (§3, §4.2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentStatus {
    Open,
    Translating,
    Spoken,
    Dropped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub segment_id: u64,
    pub speaker_identity: String,
    pub interim_text: String,
    pub final_text: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub translated_text: Option<String>,
    pub translation_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: SegmentStatus,
}

impl Segment {
    pub fn new(segment_id: u64, speaker_identity: impl Into<String>, interim_text: impl Into<String>) -> Self {
        Self {
            segment_id,
            speaker_identity: speaker_identity.into(),
            interim_text: interim_text.into(),
            final_text: None,
            first_seen_at: Utc::now(),
            finalized_at: None,
            translated_text: None,
            translation_started_at: None,
            completed_at: None,
            status: SegmentStatus::Open,
        }
    }

    pub fn is_final(&self) -> bool {
        self.final_text.is_some()
    }

    /// Deadline from §4.2: `first_seen_at + max_delay_ms`.
    pub fn deadline(&self, max_delay_ms: u64) -> DateTime<Utc> {
        self.first_seen_at + chrono::Duration::milliseconds(max_delay_ms as i64)
    }

    pub fn is_past_deadline(&self, max_delay_ms: u64, now: DateTime<Utc>) -> bool {
        now > self.deadline(max_delay_ms)
    }
}

/// Tie-break for segments sharing `first_seen_at`: order by `segment_id`
/// ascending (§4.2).
impl Ord for Segment {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.first_seen_at
            .cmp(&other.first_seen_at)
            .then_with(|| self.segment_id.cmp(&other.segment_id))
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.segment_id == other.segment_id
    }
}

impl Eq for Segment {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_on_first_seen_break_by_segment_id() {
        let mut a = Segment::new(2, "spk", "hi");
        let mut b = Segment::new(1, "spk", "hi");
        a.first_seen_at = b.first_seen_at;
        assert!(b < a);
    }

    #[test]
    fn deadline_is_first_seen_plus_max_delay() {
        let seg = Segment::new(1, "spk", "hola");
        assert!(!seg.is_past_deadline(500, seg.first_seen_at));
        let later = seg.first_seen_at + chrono::Duration::milliseconds(600);
        assert!(seg.is_past_deadline(500, later));
    }
}
