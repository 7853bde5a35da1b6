//! # Per-Event Exclusive Sections
//!
//! The serialization boundary scoped to a single event id: all reserve and
//! cancel attempts for one event take the same lock, while attempts for
//! different events proceed fully in parallel. A global lock would be
//! correct but would serialize unrelated work, so none exists here.
//!
//! Lock entries are created on demand and shared through `Arc`, so the
//! guard keeps the mutex alive even if the map entry is later touched by
//! another task. The guard releases on drop, which also covers callers that
//! disconnect after acquisition: the critical section still runs to
//! completion and releases normally.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of exclusive sections keyed by event id
#[derive(Debug, Default)]
pub struct EventLockMap {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl EventLockMap {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the exclusive section for one event.
    ///
    /// The map entry reference is dropped before awaiting the mutex, so a
    /// contended acquisition never holds a shard lock across the await.
    pub async fn acquire(&self, event_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(event_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of events that have ever taken a section
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_event_is_mutually_exclusive() {
        let locks = Arc::new(EventLockMap::new());
        let in_section = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = Arc::clone(&locks);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("evt-1").await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_events_do_not_block_each_other() {
        let locks = EventLockMap::new();

        let guard_a = locks.acquire("evt-a").await;
        // Holding evt-a must not prevent acquiring evt-b
        let guard_b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("evt-b"))
            .await
            .expect("unrelated event lock should be free");

        drop(guard_a);
        drop(guard_b);
        assert_eq!(locks.len(), 2);
    }
}
