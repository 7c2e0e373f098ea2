//! User profile snapshots: the data a Pipeline captures once at construction
//! time and never re-reads per utterance (§3 invariant).

use crate::avatar::VoiceAvatar;
use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub formal_tone: bool,
    pub preserve_emotion: bool,
}

/// `identity` is a stable opaque string assigned by the surrounding
/// application (not generated here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub identity: String,
    pub native_language: Language,
    pub preferred_voice_avatar: VoiceAvatar,
    pub preferences: Preferences,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(identity: impl Into<String>, native_language: Language, preferred_voice_avatar: VoiceAvatar) -> Self {
        Self {
            identity: identity.into(),
            native_language,
            preferred_voice_avatar,
            preferences: Preferences::default(),
            updated_at: Utc::now(),
        }
    }

    /// A frozen copy captured at pipeline-construction time. Cloning is the
    /// mechanism by which the "snapshot, not live-read" invariant holds: the
    /// pipeline owns its own `UserProfile` value and never looks the
    /// identity back up in the cache mid-utterance.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}
