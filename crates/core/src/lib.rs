//! Core domain types and provider traits for interlingo.
//!
//! Everything a per-listener translation pipeline needs in common with the
//! room coordinator and the provider adapters lives here: audio framing,
//! the closed language tag, the data model entities (§3), the provider
//! traits (§4.1), and the shared error taxonomy (§7).

pub mod audio;
pub mod avatar;
pub mod error;
pub mod language;
pub mod profile;
pub mod room;
pub mod segment;
pub mod traits;

pub use audio::{AudioEncoding, AudioFrame, Channels, SampleRate};
pub use avatar::{Gender, VoiceAvatar};
pub use error::{CoreError, ProviderErrorKind, Result};
pub use language::Language;
pub use profile::{Preferences, UserProfile};
pub use room::{Participant, Room, RoomType};
pub use segment::{Segment, SegmentStatus};
pub use traits::{
    BatchSpeechToText, EnergyVad, SpeechToText, SttOptions, SttResult, TextToSpeech, Translator,
    TtsHandle, VadConfig, VadEvent, VoiceActivityDetector,
};
