//! A logging stand-in for the real-time media transport, which §1 places
//! out of scope: it is referenced only via `interlingo_router::MediaTransport`,
//! and a real deployment plugs in whatever signaling stack owns track
//! publish/subscribe. This implementation just records what the Router
//! asked for, so the Worker Host has something to drive end to end.

use async_trait::async_trait;
use interlingo_core::Result as CoreResult;
use interlingo_router::{MediaTransport, TrackRef};

pub struct LoggingTransport {
    room_id: String,
}

impl LoggingTransport {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self { room_id: room_id.into() }
    }
}

#[async_trait]
impl MediaTransport for LoggingTransport {
    async fn subscribe(&self, listener: &str, track: &TrackRef) -> CoreResult<()> {
        tracing::debug!(room_id = %self.room_id, %listener, ?track, "subscribe");
        Ok(())
    }

    async fn unsubscribe(&self, listener: &str, track: &TrackRef) -> CoreResult<()> {
        tracing::debug!(room_id = %self.room_id, %listener, ?track, "unsubscribe");
        Ok(())
    }

    async fn publish(&self, track: &TrackRef) -> CoreResult<()> {
        tracing::debug!(room_id = %self.room_id, ?track, "publish");
        Ok(())
    }

    async fn unpublish(&self, track: &TrackRef) -> CoreResult<()> {
        tracing::debug!(room_id = %self.room_id, ?track, "unpublish");
        Ok(())
    }
}
