//! In-process TTL map of user profile snapshots (§4.7). Populated
//! proactively at room-create / token-mint and consulted on pipeline
//! construction; process-local, no cross-process coherence requirement.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use interlingo_core::{CoreError, Result as CoreResult, UserProfile};
use tokio::time::Instant;

/// Fetches a profile on a cache miss. A real implementation calls into the
/// persistence layer; tests and the fully-cached fast path never need one.
#[async_trait]
pub trait ProfileLoader: Send + Sync + 'static {
    async fn load(&self, identity: &str) -> CoreResult<UserProfile>;
}

struct CacheEntry {
    snapshot: UserProfile,
    cached_at: Instant,
}

pub struct ProfileCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// `put` is how profile CRUD pre-populates the cache (§4.7); also used
    /// internally after a loader fetch.
    pub fn put(&self, snapshot: UserProfile) {
        self.entries.insert(
            snapshot.identity.clone(),
            CacheEntry {
                snapshot,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, identity: &str) {
        self.entries.remove(identity);
    }

    fn fresh(&self, entry: &CacheEntry) -> bool {
        entry.cached_at.elapsed() < self.ttl
    }

    /// Returns the cached snapshot if present and unexpired, otherwise
    /// fetches through `loader`, caches the result, and returns it.
    pub async fn get(&self, identity: &str, loader: &dyn ProfileLoader) -> CoreResult<UserProfile> {
        if let Some(entry) = self.entries.get(identity) {
            if self.fresh(&entry) {
                return Ok(entry.snapshot.clone());
            }
        }
        let snapshot = loader.load(identity).await?;
        self.put(snapshot.clone());
        Ok(snapshot)
    }

    /// Removes every entry older than the configured TTL. The background
    /// sweeper (§4.7, ~10 min default) is just this called on an interval.
    pub fn sweep_expired(&self) {
        self.entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spawns the periodic sweeper described in §4.7. Returns a handle the
/// caller can abort on shutdown.
pub fn spawn_sweeper(cache: Arc<ProfileCache>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            cache.sweep_expired();
        }
    })
}

/// A loader that never finds anything; useful when every profile is
/// expected to already be `put()` proactively and a miss is an error
/// worth surfacing rather than silently fetching.
pub struct NoSuchProfileLoader;

#[async_trait]
impl ProfileLoader for NoSuchProfileLoader {
    async fn load(&self, identity: &str) -> CoreResult<UserProfile> {
        Err(CoreError::invariant(format!(
            "no profile loader configured and '{identity}' is not cached"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlingo_core::{Gender, Language, VoiceAvatar};

    fn profile(identity: &str) -> UserProfile {
        UserProfile::new(
            identity,
            Language::En,
            VoiceAvatar::new("v1", "fake", Language::En, "Voice", Gender::Neutral),
        )
    }

    #[tokio::test]
    async fn put_then_get_hits_cache_without_loader() {
        let cache = ProfileCache::new(Duration::from_secs(60));
        cache.put(profile("alice"));
        let result = cache.get("alice", &NoSuchProfileLoader).await.unwrap();
        assert_eq!(result.identity, "alice");
    }

    #[tokio::test]
    async fn miss_falls_through_to_loader_and_caches_result() {
        struct StaticLoader;
        #[async_trait]
        impl ProfileLoader for StaticLoader {
            async fn load(&self, identity: &str) -> CoreResult<UserProfile> {
                Ok(profile(identity))
            }
        }

        let cache = ProfileCache::new(Duration::from_secs(60));
        assert!(cache.is_empty());
        let result = cache.get("bob", &StaticLoader).await.unwrap();
        assert_eq!(result.identity, "bob");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_swept() {
        let cache = ProfileCache::new(Duration::from_millis(1));
        cache.put(profile("carol"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.sweep_expired();
        assert!(cache.is_empty());
    }
}
