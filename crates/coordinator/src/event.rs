//! Inputs the Room Coordinator reacts to (§4.5).

use interlingo_core::{Language, VoiceAvatar};

#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    ParticipantJoined {
        identity: String,
        language: Language,
        avatar: VoiceAvatar,
    },
    ParticipantLeft {
        identity: String,
    },
    ParticipantMetadataChanged {
        identity: String,
        language: Language,
        avatar: VoiceAvatar,
    },
    PipelineFailed {
        listener: String,
        speaker: String,
        reason: String,
    },
    /// Periodic reconciliation trigger; also fired internally by the
    /// coordinator's own ticker (§4.5).
    Tick,
}

/// A diagnostic the Coordinator reports outward (control-channel event to
/// the listener, or an operator-facing log/metric). Kept separate from
/// [`CoordinatorEvent`] since it flows out, not in.
#[derive(Debug, Clone)]
pub enum CoordinatorNotification {
    PipelineFailed { listener: String, speaker: String, reason: String },
    TopologyChanged { actions: usize },
}
