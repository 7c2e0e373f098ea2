//! Side-effecting boundary the router drives its plans through. No concrete
//! media transport lives in this crate — a real implementation binds this
//! trait to the media server's subscribe/publish SDK.

use async_trait::async_trait;
use interlingo_core::Result;

/// Identifies one audio track the router can subscribe a listener to or
/// publish on a participant's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackRef {
    /// A speaker's own microphone track.
    Raw { speaker: String },
    /// The track a Pipeline publishes, carrying `speaker`'s translated
    /// audio, intended only for `listener`.
    Translated { speaker: String, listener: String },
}

impl TrackRef {
    pub fn owner(&self) -> &str {
        match self {
            TrackRef::Raw { speaker } => speaker,
            TrackRef::Translated { speaker, .. } => speaker,
        }
    }
}

/// The effects a router plan is made of. Implementations must be
/// idempotent at the transport level too: subscribing twice to the same
/// track should not error.
#[async_trait]
pub trait MediaTransport: Send + Sync + 'static {
    async fn subscribe(&self, listener: &str, track: &TrackRef) -> Result<()>;
    async fn unsubscribe(&self, listener: &str, track: &TrackRef) -> Result<()>;
    async fn publish(&self, track: &TrackRef) -> Result<()>;
    async fn unpublish(&self, track: &TrackRef) -> Result<()>;
}
