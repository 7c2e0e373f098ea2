//! Room and participant registry entities.

use crate::avatar::VoiceAvatar;
use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    General,
    Translation,
    Conference,
}

impl RoomType {
    /// A `translation` room forces `max_participants = 2` and eagerly
    /// provisions pipelines between its two participants (§3).
    pub fn forced_max_participants(&self) -> Option<u32> {
        match self {
            RoomType::Translation => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub room_name: String,
    pub host_identity: String,
    pub room_type: RoomType,
    pub max_participants: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(room_id: impl Into<String>, room_name: impl Into<String>, host_identity: impl Into<String>, room_type: RoomType, max_participants: u32) -> Self {
        let max_participants = room_type.forced_max_participants().unwrap_or(max_participants);
        Self {
            room_id: room_id.into(),
            room_name: room_name.into(),
            host_identity: host_identity.into(),
            room_type,
            max_participants,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Runtime participant state. `present` mirrors the media-transport's
/// subscribed-connection signal, not merely registry membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub identity: String,
    pub language: Language,
    pub avatar: VoiceAvatar,
    pub joined_at: DateTime<Utc>,
    pub present: bool,
}

impl Participant {
    pub fn new(identity: impl Into<String>, language: Language, avatar: VoiceAvatar) -> Self {
        Self {
            identity: identity.into(),
            language,
            avatar,
            joined_at: Utc::now(),
            present: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_room_forces_two_participants() {
        let room = Room::new("r1", "demo", "host", RoomType::Translation, 10);
        assert_eq!(room.max_participants, 2);
    }

    #[test]
    fn general_room_keeps_requested_capacity() {
        let room = Room::new("r2", "demo", "host", RoomType::General, 10);
        assert_eq!(room.max_participants, 10);
    }
}
