//! Bounded poll registry using moka
//!
//! Polls live in a concurrent cache keyed by [`PollId`] with a capacity and
//! an optional time-to-idle, so abandoned polls are eventually evicted
//! instead of accumulating for the life of the process.

use crate::record::{PollId, PollRecord, Selection};
use moka::future::Cache;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Default number of polls kept
pub const DEFAULT_CAPACITY: u64 = 1_024;

/// Statistics for registry monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStats {
    /// Number of tracked polls
    pub entry_count: u64,
}

/// Registry of issued polls
///
/// Each record sits behind its own lock; a vote is applied entirely under
/// that lock.
#[derive(Debug, Clone)]
pub struct PollRegistry {
    inner: Cache<PollId, Arc<Mutex<PollRecord>>>,
}

impl PollRegistry {
    /// Create registry with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create registry whose polls expire after `idle` without access
    #[inline]
    #[must_use]
    pub fn with_idle_ttl(max_capacity: u64, idle: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Track a newly issued poll, replacing any record under the same id
    pub async fn register(&self, id: PollId, record: PollRecord) {
        tracing::debug!(poll = %id, options = record.options().len(), "poll registered");
        self.inner.insert(id, Arc::new(Mutex::new(record))).await;
    }

    /// Check if `id` is tracked
    #[inline]
    #[must_use]
    pub async fn contains(&self, id: &PollId) -> bool {
        self.inner.get(id).await.is_some()
    }

    /// Copy of the current record
    #[must_use]
    pub async fn snapshot(&self, id: &PollId) -> Option<PollRecord> {
        let record = self.inner.get(id).await?;
        let guard = record.lock();
        Some(guard.clone())
    }

    /// Apply a selection to a tracked poll; `None` if `id` is untracked
    pub async fn apply_selection(
        &self,
        id: &PollId,
        voter: &str,
        selected: &[usize],
    ) -> Option<Selection> {
        let record = self.inner.get(id).await?;
        let mut guard = record.lock();
        Some(guard.apply_selection(voter, selected))
    }

    /// Stop tracking a poll
    #[inline]
    pub async fn invalidate(&self, id: &PollId) {
        self.inner.invalidate(id).await;
    }

    /// Get registry statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for PollRegistry {
    /// Create registry with default capacity (1,024 polls)
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll() -> PollRecord {
        PollRecord::new("Who is coming?", vec!["Yes".into(), "No".into()]).unwrap()
    }

    #[tokio::test]
    async fn register_and_snapshot() {
        let registry = PollRegistry::default();
        let id = PollId::new("p1");
        registry.register(id.clone(), poll()).await;

        assert!(registry.contains(&id).await);
        assert_eq!(registry.snapshot(&id).await.unwrap().question(), "Who is coming?");
    }

    #[tokio::test]
    async fn untracked_poll_is_none() {
        let registry = PollRegistry::new(10);
        assert!(registry.snapshot(&PollId::new("nope")).await.is_none());
        assert!(registry
            .apply_selection(&PollId::new("nope"), "@x", &[0])
            .await
            .is_none());
    }

    #[tokio::test]
    async fn selection_mutates_shared_record() {
        let registry = PollRegistry::with_idle_ttl(10, Duration::from_secs(60));
        let id = PollId::new("p1");
        registry.register(id.clone(), poll()).await;

        let clone = registry.clone();
        clone.apply_selection(&id, "@x", &[1]).await.unwrap();

        let record = registry.snapshot(&id).await.unwrap();
        assert_eq!(record.option_of("@x"), Some(1));
    }

    #[tokio::test]
    async fn invalidate_forgets_poll() {
        let registry = PollRegistry::default();
        let id = PollId::new("p1");
        registry.register(id.clone(), poll()).await;
        registry.invalidate(&id).await;

        assert!(!registry.contains(&id).await);
    }
}
