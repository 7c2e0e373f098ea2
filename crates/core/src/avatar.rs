//! Voice avatars: the TTS identity a listener hears translations in.

use crate::language::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

/// Immutable once created. `voice_id` is opaque to the core; it is
/// forwarded verbatim to whichever TTS adapter `provider` names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAvatar {
    pub voice_id: String,
    pub provider: String,
    pub language: Language,
    pub display_name: String,
    pub gender: Gender,
    pub accent: Option<String>,
    pub description: Option<String>,
}

impl VoiceAvatar {
    pub fn new(voice_id: impl Into<String>, provider: impl Into<String>, language: Language, display_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            voice_id: voice_id.into(),
            provider: provider.into(),
            language,
            display_name: display_name.into(),
            gender,
            accent: None,
            description: None,
        }
    }
}
