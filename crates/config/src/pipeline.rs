//! Pipeline and buffer tuning knobs (§4.2, §4.3, §5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum retry attempts for transient provider errors (§4.3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Total wall-clock budget for all retries combined (ms).
    #[serde(default = "default_retry_budget_ms")]
    pub retry_budget_ms: u64,

    /// Grace window teardown waits for in-flight tasks to acknowledge
    /// cancellation before forcing resource release (§5).
    #[serde(default = "default_teardown_grace_ms")]
    pub teardown_grace_ms: u64,

    /// STT-out bounded queue capacity (§5).
    #[serde(default = "default_stt_out_capacity")]
    pub stt_out_capacity: usize,

    /// Translator-out bounded queue capacity (§5).
    #[serde(default = "default_translator_out_capacity")]
    pub translator_out_capacity: usize,
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_budget_ms() -> u64 {
    1_000
}
fn default_teardown_grace_ms() -> u64 {
    2_000
}
fn default_stt_out_capacity() -> usize {
    16
}
fn default_translator_out_capacity() -> usize {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_budget_ms: default_retry_budget_ms(),
            teardown_grace_ms: default_teardown_grace_ms(),
            stt_out_capacity: default_stt_out_capacity(),
            translator_out_capacity: default_translator_out_capacity(),
        }
    }
}

/// Translation Buffer tuning (§4.2). `max_delay_ms` is the single knob for
/// the open question in SPEC_FULL.md §9 about the latency ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_interim_trigger_ms")]
    pub interim_trigger_ms: u64,

    #[serde(default = "default_utterance_end_ms")]
    pub utterance_end_ms: u64,

    /// Minimum word-count delta between successive interim texts for the
    /// same segment before a new interim translation is considered
    /// "materially different" (§4.2).
    #[serde(default = "default_interim_word_delta")]
    pub interim_word_delta: usize,
}

fn default_max_delay_ms() -> u64 {
    500
}
fn default_interim_trigger_ms() -> u64 {
    250
}
fn default_utterance_end_ms() -> u64 {
    500
}
fn default_interim_word_delta() -> usize {
    2
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_max_delay_ms(),
            interim_trigger_ms: default_interim_trigger_ms(),
            utterance_end_ms: default_utterance_end_ms(),
            interim_word_delta: default_interim_word_delta(),
        }
    }
}

/// Room Coordinator reconciliation and profile-cache tuning (§4.5, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_reconciliation_interval_ms")]
    pub reconciliation_interval_ms: u64,

    #[serde(default = "default_profile_cache_ttl_ms")]
    pub profile_cache_ttl_ms: u64,

    #[serde(default = "default_profile_sweep_interval_ms")]
    pub profile_sweep_interval_ms: u64,
}

fn default_reconciliation_interval_ms() -> u64 {
    5_000
}
fn default_profile_cache_ttl_ms() -> u64 {
    30 * 60 * 1000
}
fn default_profile_sweep_interval_ms() -> u64 {
    10 * 60 * 1000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            reconciliation_interval_ms: default_reconciliation_interval_ms(),
            profile_cache_ttl_ms: default_profile_cache_ttl_ms(),
            profile_sweep_interval_ms: default_profile_sweep_interval_ms(),
        }
    }
}
