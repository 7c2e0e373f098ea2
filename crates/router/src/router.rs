//! Stateful diffing layer: compares the previously applied topology against
//! the topology implied by the current room state and emits only the
//! actions needed to close the gap, in an order that never leaves a
//! listener subscribed to both the raw and translated version of the same
//! speaker (§4.4).

use std::sync::Arc;

use interlingo_core::Result;
use tokio::sync::Mutex;

use crate::topology::{desired_topology, Edge, RoomState, Topology};
use crate::transport::{MediaTransport, TrackRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SubscribeRaw { listener: String, speaker: String },
    UnsubscribeRaw { listener: String, speaker: String },
    SubscribeTranslated { listener: String, speaker: String },
    UnsubscribeTranslated { listener: String, speaker: String },
    PublishTranslated { speaker: String, listener: String },
    UnpublishTranslated { speaker: String, listener: String },
}

pub type Plan = Vec<Action>;

/// Computes the ordered action list for one (listener, speaker) pair's
/// transition. `switching into` a translated edge drops the raw
/// subscription first; `switching out` tears the translated edge down
/// before raw comes back, per the sequencing rule in §4.4.
fn transition(listener: &str, speaker: &str, from: Option<Edge>, to: Option<Edge>) -> Plan {
    use Edge::*;
    match (from, to) {
        (None, None) | (Some(Raw), Some(Raw)) | (Some(Translated), Some(Translated)) => vec![],
        (None, Some(Raw)) => vec![Action::SubscribeRaw {
            listener: listener.into(),
            speaker: speaker.into(),
        }],
        (Some(Raw), None) => vec![Action::UnsubscribeRaw {
            listener: listener.into(),
            speaker: speaker.into(),
        }],
        (None, Some(Translated)) => vec![
            Action::PublishTranslated {
                speaker: speaker.into(),
                listener: listener.into(),
            },
            Action::SubscribeTranslated {
                listener: listener.into(),
                speaker: speaker.into(),
            },
        ],
        (Some(Translated), None) => vec![
            Action::UnsubscribeTranslated {
                listener: listener.into(),
                speaker: speaker.into(),
            },
            Action::UnpublishTranslated {
                speaker: speaker.into(),
                listener: listener.into(),
            },
        ],
        (Some(Raw), Some(Translated)) => vec![
            Action::UnsubscribeRaw {
                listener: listener.into(),
                speaker: speaker.into(),
            },
            Action::PublishTranslated {
                speaker: speaker.into(),
                listener: listener.into(),
            },
            Action::SubscribeTranslated {
                listener: listener.into(),
                speaker: speaker.into(),
            },
        ],
        (Some(Translated), Some(Raw)) => vec![
            Action::UnsubscribeTranslated {
                listener: listener.into(),
                speaker: speaker.into(),
            },
            Action::UnpublishTranslated {
                speaker: speaker.into(),
                listener: listener.into(),
            },
            Action::SubscribeRaw {
                listener: listener.into(),
                speaker: speaker.into(),
            },
        ],
    }
}

/// Diffs `desired` against `applied` and returns the actions needed to
/// bring `applied` to `desired`. Pure; callers decide whether/how to
/// execute the result.
pub fn diff(applied: &Topology, desired: &Topology) -> Plan {
    let mut plan = Plan::new();
    let mut keys: Vec<&(String, String)> = applied.keys().chain(desired.keys()).collect();
    keys.sort();
    keys.dedup();

    for (listener, speaker) in keys {
        let from = applied.get(&(listener.clone(), speaker.clone())).copied();
        let to = desired.get(&(listener.clone(), speaker.clone())).copied();
        plan.extend(transition(listener, speaker, from, to));
    }

    plan
}

/// Stateful router: owns the topology it last applied and the transport
/// that carries out a plan's actions.
pub struct AudioRouter<T: MediaTransport> {
    transport: Arc<T>,
    applied: Mutex<Topology>,
}

impl<T: MediaTransport> AudioRouter<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            applied: Mutex::new(Topology::new()),
        }
    }

    /// Computes the plan implied by `room`, applies every action through
    /// the transport, and records the new topology as applied. Calling
    /// this twice with an unchanged `room` produces an empty plan the
    /// second time (§4.4 idempotency).
    pub async fn set_topology(&self, room: &RoomState) -> Result<Plan> {
        let desired = desired_topology(room);
        let mut applied = self.applied.lock().await;
        let plan = diff(&applied, &desired);
        if !plan.is_empty() {
            tracing::debug!(actions = plan.len(), "applying audio router plan");
        }

        for action in &plan {
            self.apply_one(action).await?;
        }

        *applied = desired;
        Ok(plan)
    }

    async fn apply_one(&self, action: &Action) -> Result<()> {
        match action {
            Action::SubscribeRaw { listener, speaker } => {
                self.transport
                    .subscribe(listener, &TrackRef::Raw { speaker: speaker.clone() })
                    .await
            }
            Action::UnsubscribeRaw { listener, speaker } => {
                self.transport
                    .unsubscribe(listener, &TrackRef::Raw { speaker: speaker.clone() })
                    .await
            }
            Action::SubscribeTranslated { listener, speaker } => {
                self.transport
                    .subscribe(
                        listener,
                        &TrackRef::Translated {
                            speaker: speaker.clone(),
                            listener: listener.clone(),
                        },
                    )
                    .await
            }
            Action::UnsubscribeTranslated { listener, speaker } => {
                self.transport
                    .unsubscribe(
                        listener,
                        &TrackRef::Translated {
                            speaker: speaker.clone(),
                            listener: listener.clone(),
                        },
                    )
                    .await
            }
            Action::PublishTranslated { speaker, listener } => {
                self.transport
                    .publish(&TrackRef::Translated {
                        speaker: speaker.clone(),
                        listener: listener.clone(),
                    })
                    .await
            }
            Action::UnpublishTranslated { speaker, listener } => {
                self.transport
                    .unpublish(&TrackRef::Translated {
                        speaker: speaker.clone(),
                        listener: listener.clone(),
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ParticipantState;
    use interlingo_core::Language;
    use parking_lot::Mutex as SyncMutex;

    #[derive(Default)]
    struct RecordingTransport {
        calls: SyncMutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl MediaTransport for RecordingTransport {
        async fn subscribe(&self, listener: &str, track: &TrackRef) -> Result<()> {
            self.calls.lock().push(format!("subscribe({listener},{track:?})"));
            Ok(())
        }
        async fn unsubscribe(&self, listener: &str, track: &TrackRef) -> Result<()> {
            self.calls.lock().push(format!("unsubscribe({listener},{track:?})"));
            Ok(())
        }
        async fn publish(&self, track: &TrackRef) -> Result<()> {
            self.calls.lock().push(format!("publish({track:?})"));
            Ok(())
        }
        async fn unpublish(&self, track: &TrackRef) -> Result<()> {
            self.calls.lock().push(format!("unpublish({track:?})"));
            Ok(())
        }
    }

    fn participant(identity: &str, language: Language) -> ParticipantState {
        ParticipantState {
            identity: identity.into(),
            language,
            present: true,
        }
    }

    #[tokio::test]
    async fn reapplying_the_same_room_state_is_a_no_op() {
        let transport = Arc::new(RecordingTransport::default());
        let router = AudioRouter::new(transport.clone());
        let room = RoomState {
            participants: vec![participant("a", Language::En), participant("b", Language::Es)],
        };

        let first = router.set_topology(&room).await.unwrap();
        assert!(!first.is_empty());
        let second = router.set_topology(&room).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn switching_into_translated_unsubscribes_raw_before_subscribing_translated() {
        let transport = Arc::new(RecordingTransport::default());
        let router = AudioRouter::new(transport.clone());

        let same_lang = RoomState {
            participants: vec![participant("a", Language::En), participant("b", Language::En)],
        };
        router.set_topology(&same_lang).await.unwrap();

        let diff_lang = RoomState {
            participants: vec![participant("a", Language::En), participant("b", Language::Es)],
        };
        router.set_topology(&diff_lang).await.unwrap();

        let calls = transport.calls.lock();
        let unsub_raw = calls.iter().position(|c| c.starts_with("unsubscribe(a") && c.contains("Raw")).unwrap();
        let sub_translated = calls
            .iter()
            .position(|c| c.starts_with("subscribe(a") && c.contains("Translated"))
            .unwrap();
        assert!(unsub_raw < sub_translated);
    }

    #[test]
    fn no_edge_to_no_edge_produces_no_actions() {
        assert!(transition("a", "b", None, None).is_empty());
    }
}
