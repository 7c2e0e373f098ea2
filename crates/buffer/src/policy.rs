//! Trigger policy knobs (§4.2). Kept local to the buffer crate rather than
//! pulled from `interlingo-config` so the buffer has no dependency on the
//! worker host's configuration layer; the worker wires the numbers through
//! at construction time.

#[derive(Debug, Clone, Copy)]
pub struct BufferPolicy {
    pub max_delay_ms: u64,
    pub interim_trigger_ms: u64,
    pub utterance_end_ms: u64,
    pub interim_word_delta: usize,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            max_delay_ms: 500,
            interim_trigger_ms: 250,
            utterance_end_ms: 500,
            interim_word_delta: 2,
        }
    }
}

impl BufferPolicy {
    /// §4.2: trigger an interim translation once the segment is old enough
    /// and the new interim text differs materially (word-count delta) from
    /// the last interim submitted for it.
    pub fn should_trigger_interim(&self, segment_age_ms: u64, word_delta: usize) -> bool {
        segment_age_ms >= self.interim_trigger_ms && word_delta >= self.interim_word_delta
    }
}

fn word_count(text: &str) -> usize {
    unicode_segmentation::UnicodeSegmentation::unicode_words(text).count()
}

pub fn word_delta(previous: &str, current: &str) -> usize {
    word_count(current).abs_diff(word_count(previous))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interim_is_not_triggered_before_the_age_floor() {
        let policy = BufferPolicy::default();
        assert!(!policy.should_trigger_interim(100, 5));
    }

    #[test]
    fn interim_is_not_triggered_without_a_material_word_delta() {
        let policy = BufferPolicy::default();
        assert!(!policy.should_trigger_interim(300, 0));
    }

    #[test]
    fn interim_triggers_once_both_conditions_hold() {
        let policy = BufferPolicy::default();
        assert!(policy.should_trigger_interim(300, 3));
    }

    #[test]
    fn word_delta_counts_added_words() {
        assert_eq!(word_delta("hello", "hello there friend"), 2);
    }
}
