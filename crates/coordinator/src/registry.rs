//! Authoritative per-room registry (§4.5): present participants and the
//! pipelines that must exist for them. `expected_pairs` is the predicate
//! both event handling and the reconciliation sweep diff against.

use std::collections::{BTreeSet, HashMap};

use interlingo_core::{Language, VoiceAvatar};

#[derive(Debug, Clone)]
pub struct RegisteredParticipant {
    pub identity: String,
    pub language: Language,
    pub avatar: VoiceAvatar,
}

#[derive(Default)]
pub struct RoomRegistry {
    participants: HashMap<String, RegisteredParticipant>,
}

impl RoomRegistry {
    pub fn upsert(&mut self, participant: RegisteredParticipant) {
        self.participants.insert(participant.identity.clone(), participant);
    }

    pub fn remove(&mut self, identity: &str) -> Option<RegisteredParticipant> {
        self.participants.remove(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&RegisteredParticipant> {
        self.participants.get(identity)
    }

    pub fn participants(&self) -> impl Iterator<Item = &RegisteredParticipant> {
        self.participants.values()
    }

    /// Every ordered `(listener, speaker)` pair that should have a Pipeline
    /// right now: both present, distinct identities, distinct languages
    /// (§3 invariant, §4.5 reconciliation predicate).
    pub fn expected_pairs(&self) -> BTreeSet<(String, String)> {
        let mut pairs = BTreeSet::new();
        for listener in self.participants.values() {
            for speaker in self.participants.values() {
                if listener.identity == speaker.identity {
                    continue;
                }
                if listener.language != speaker.language {
                    pairs.insert((listener.identity.clone(), speaker.identity.clone()));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlingo_core::Gender;

    fn participant(identity: &str, language: Language) -> RegisteredParticipant {
        RegisteredParticipant {
            identity: identity.into(),
            language,
            avatar: VoiceAvatar::new("v", "fake", language, "Voice", Gender::Neutral),
        }
    }

    #[test]
    fn same_language_participants_need_no_pipelines() {
        let mut registry = RoomRegistry::default();
        registry.upsert(participant("a", Language::En));
        registry.upsert(participant("b", Language::En));
        assert!(registry.expected_pairs().is_empty());
    }

    #[test]
    fn differing_languages_need_a_pipeline_each_direction() {
        let mut registry = RoomRegistry::default();
        registry.upsert(participant("a", Language::En));
        registry.upsert(participant("b", Language::Es));
        let pairs = registry.expected_pairs();
        assert!(pairs.contains(&("a".to_string(), "b".to_string())));
        assert!(pairs.contains(&("b".to_string(), "a".to_string())));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn removing_a_participant_drops_their_pairs() {
        let mut registry = RoomRegistry::default();
        registry.upsert(participant("a", Language::En));
        registry.upsert(participant("b", Language::Es));
        registry.remove("b");
        assert!(registry.expected_pairs().is_empty());
    }
}
