//! Pure computation of what a listener should be subscribed to, given a
//! room snapshot (§4.4). No I/O; [`crate::router::AudioRouter`] is the
//! stateful layer that diffs this against what is actually applied.

use std::collections::BTreeMap;

use interlingo_core::Language;

#[derive(Debug, Clone)]
pub struct ParticipantState {
    pub identity: String,
    pub language: Language,
    pub present: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RoomState {
    pub participants: Vec<ParticipantState>,
}

/// What a listener currently hears from one other speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Languages match: listener hears the speaker's raw track.
    Raw,
    /// Languages differ: listener hears a Pipeline-published translated
    /// track instead.
    Translated,
}

/// `(listener, speaker) -> edge` for every present, distinct pair whose
/// languages imply a subscription. Absent entries mean "nothing", which
/// only happens for the (identity, identity) pair — a listener is never
/// wired to their own track (§3 invariant).
pub type Topology = BTreeMap<(String, String), Edge>;

pub fn desired_topology(room: &RoomState) -> Topology {
    let present: Vec<&ParticipantState> = room.participants.iter().filter(|p| p.present).collect();
    let mut topology = Topology::new();

    for listener in &present {
        for speaker in &present {
            if listener.identity == speaker.identity {
                continue;
            }
            let edge = if listener.language == speaker.language {
                Edge::Raw
            } else {
                Edge::Translated
            };
            topology.insert((listener.identity.clone(), speaker.identity.clone()), edge);
        }
    }

    topology
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlingo_core::Language;

    fn participant(identity: &str, language: Language) -> ParticipantState {
        ParticipantState {
            identity: identity.into(),
            language,
            present: true,
        }
    }

    #[test]
    fn same_language_pair_is_raw() {
        let room = RoomState {
            participants: vec![participant("a", Language::En), participant("b", Language::En)],
        };
        let topology = desired_topology(&room);
        assert_eq!(topology[&("a".into(), "b".into())], Edge::Raw);
        assert_eq!(topology[&("b".into(), "a".into())], Edge::Raw);
    }

    #[test]
    fn different_language_pair_is_translated() {
        let room = RoomState {
            participants: vec![participant("a", Language::En), participant("b", Language::Es)],
        };
        let topology = desired_topology(&room);
        assert_eq!(topology[&("a".into(), "b".into())], Edge::Translated);
        assert_eq!(topology[&("b".into(), "a".into())], Edge::Translated);
    }

    #[test]
    fn absent_participants_produce_no_edges() {
        let room = RoomState {
            participants: vec![
                participant("a", Language::En),
                ParticipantState {
                    identity: "b".into(),
                    language: Language::En,
                    present: false,
                },
            ],
        };
        assert!(desired_topology(&room).is_empty());
    }

    #[test]
    fn a_listener_never_gets_an_edge_to_themselves() {
        let room = RoomState {
            participants: vec![participant("a", Language::En)],
        };
        assert!(desired_topology(&room).is_empty());
    }

    #[test]
    fn three_distinct_languages_produce_six_translated_edges_and_no_raw() {
        let room = RoomState {
            participants: vec![
                participant("a", Language::En),
                participant("b", Language::Es),
                participant("c", Language::Fr),
            ],
        };
        let topology = desired_topology(&room);
        assert_eq!(topology.len(), 6);
        assert!(topology.values().all(|edge| *edge == Edge::Translated));

        for listener in ["a", "b", "c"] {
            let edges_from_listener = topology.keys().filter(|(l, _)| l == listener).count();
            assert_eq!(edges_from_listener, 2, "listener {listener} should hear exactly two other speakers");
        }
    }
}
