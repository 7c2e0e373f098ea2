//! Bridges `interlingo-persistence`'s `UserProfileRepository` to the
//! Coordinator's `ProfileLoader` boundary (§4.7): a cache miss falls
//! through to ScyllaDB, not directly to the caller.

use async_trait::async_trait;
use interlingo_core::{CoreError, Result as CoreResult, UserProfile};
use interlingo_coordinator::ProfileLoader;
use interlingo_persistence::PersistenceLayer;

pub struct PersistentProfileLoader {
    persistence: PersistenceLayer,
}

impl PersistentProfileLoader {
    pub fn new(persistence: PersistenceLayer) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl ProfileLoader for PersistentProfileLoader {
    async fn load(&self, identity: &str) -> CoreResult<UserProfile> {
        self.persistence
            .user_profiles
            .fetch_user_profile(identity)
            .await
            .map_err(|e| CoreError::transport(format!("profile lookup for '{identity}' failed: {e}")))?
            .ok_or_else(|| CoreError::invariant(format!("no persisted profile for '{identity}'")))
    }
}
