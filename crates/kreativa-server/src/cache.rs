//! Short-lived cache of the approved profile set behind the public browse
//! endpoint. Every moderation mutation calls [`PublicProfileCache::invalidate`].
//!
//! A reload only installs its snapshot if no invalidation happened while it
//! was querying.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use kreativa_core::ProfileSummary;
use kreativa_db::DbError;
use sqlx::PgPool;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Snapshot {
    loaded_at: Instant,
    profiles: Arc<Vec<ProfileSummary>>,
}

#[derive(Debug, Clone)]
pub struct PublicProfileCache {
    ttl: Duration,
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    /// Bumped by every invalidation, always under the snapshot write lock.
    generation: Arc<AtomicU64>,
}

impl PublicProfileCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    async fn fresh(&self) -> Option<Arc<Vec<ProfileSummary>>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| s.loaded_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.profiles))
    }

    /// Returns the cached approved set, reloading it from the database when
    /// the snapshot is missing or stale.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the reload query fails or a stored row holds a
    /// label outside the closed sets.
    pub async fn approved_profiles(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<ProfileSummary>>, DbError> {
        if let Some(profiles) = self.fresh().await {
            return Ok(profiles);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let rows = kreativa_db::list_approved_profiles(pool).await?;
        let profiles = Arc::new(
            rows.iter()
                .map(kreativa_db::ProfileRow::to_summary)
                .collect::<Result<Vec<_>, _>>()?,
        );

        if self.store_if_current(generation, Arc::clone(&profiles)).await {
            tracing::debug!(count = profiles.len(), "public profile cache reloaded");
        } else {
            tracing::debug!("public profile cache invalidated during reload; snapshot discarded");
        }
        Ok(profiles)
    }

    /// Installs `profiles` unless the cache was invalidated after
    /// `generation` was read.
    async fn store_if_current(&self, generation: u64, profiles: Arc<Vec<ProfileSummary>>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *snapshot = Some(Snapshot {
            loaded_at: Instant::now(),
            profiles,
        });
        true
    }

    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        *snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(cache: &PublicProfileCache) {
        *cache.snapshot.write().await = Some(Snapshot {
            loaded_at: Instant::now(),
            profiles: Arc::new(Vec::new()),
        });
    }

    #[tokio::test]
    async fn fresh_snapshot_is_served_until_invalidated() {
        let cache = PublicProfileCache::new(Duration::from_secs(60));
        assert!(cache.fresh().await.is_none());

        seed(&cache).await;
        assert!(cache.fresh().await.is_some());

        cache.invalidate().await;
        assert!(cache.fresh().await.is_none());
    }

    #[tokio::test]
    async fn reload_that_raced_an_invalidation_is_discarded() {
        let cache = PublicProfileCache::new(Duration::from_secs(60));
        let before = cache.generation.load(Ordering::Acquire);

        // A moderation mutation lands while the reload query is in flight.
        cache.invalidate().await;

        assert!(!cache.store_if_current(before, Arc::new(Vec::new())).await);
        assert!(cache.fresh().await.is_none());

        let current = cache.generation.load(Ordering::Acquire);
        assert!(cache.store_if_current(current, Arc::new(Vec::new())).await);
        assert!(cache.fresh().await.is_some());
    }

    #[tokio::test]
    async fn clones_share_invalidation() {
        let cache = PublicProfileCache::new(Duration::from_secs(60));
        let handle = cache.clone();
        let before = cache.generation.load(Ordering::Acquire);
        handle.invalidate().await;
        assert!(!cache.store_if_current(before, Arc::new(Vec::new())).await);
    }

    #[tokio::test]
    async fn zero_ttl_never_serves_cached_data() {
        let cache = PublicProfileCache::new(Duration::ZERO);
        seed(&cache).await;
        assert!(cache.fresh().await.is_none());
    }
}
