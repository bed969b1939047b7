//! Fingerprint cache for request coalescing.
//!
//! Entries have two ages that matter:
//! - below the *coalescing window* an entry is live and is handed out;
//! - past the *retention* bound (10x the window) it is purged by `sweep`.
//!
//! Between the two an entry is kept but never returned. Timestamps come from
//! an injected clock so expiry is deterministic under test. The cache holds
//! no lock of its own; its owner serializes access.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Multiple of the coalescing window after which entries are purged.
pub const RETENTION_FACTOR: i32 = 10;

pub struct CoalescingCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    window: Duration,
    retention: Duration,
}

struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
}

impl<K, V> CoalescingCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries are live for `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
            retention: window * RETENTION_FACTOR,
        }
    }

    /// Record a value, replacing any existing entry and resetting its age.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
            },
        );
    }

    /// Get a value if its entry is younger than the coalescing window.
    pub fn get_live(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| now - entry.created_at < self.window)
            .map(|entry| entry.value.clone())
    }

    /// Remove entries older than the retention bound; returns how many.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before_count = self.entries.len();
        let retention = self.retention;
        self.entries
            .retain(|_, entry| now - entry.created_at <= retention);
        before_count - self.entries.len()
    }

    /// Number of entries, including ones past the window not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::milliseconds(1000)
    }

    #[test]
    fn insert_and_get_within_window() {
        let now = Utc::now();
        let mut cache: CoalescingCache<String, i32> = CoalescingCache::new(window());
        cache.insert("key".to_string(), 42, now);

        assert_eq!(cache.get_live(&"key".to_string(), now), Some(42));
        assert_eq!(
            cache.get_live(&"key".to_string(), now + Duration::milliseconds(999)),
            Some(42)
        );
    }

    #[test]
    fn get_returns_none_for_missing() {
        let cache: CoalescingCache<String, i32> = CoalescingCache::new(window());
        assert_eq!(cache.get_live(&"missing".to_string(), Utc::now()), None);
    }

    #[test]
    fn entries_past_window_are_not_returned_but_kept() {
        let now = Utc::now();
        let mut cache: CoalescingCache<String, i32> = CoalescingCache::new(window());
        cache.insert("key".to_string(), 42, now);

        let later = now + window();
        assert_eq!(cache.get_live(&"key".to_string(), later), None);
        assert_eq!(cache.sweep(later), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep_removes_entries_past_retention() {
        let now = Utc::now();
        let mut cache: CoalescingCache<String, i32> = CoalescingCache::new(window());
        cache.insert("old1".to_string(), 1, now);
        cache.insert("old2".to_string(), 2, now);
        cache.insert("new".to_string(), 3, now + Duration::milliseconds(5000));

        let removed = cache.sweep(now + Duration::milliseconds(10_001));

        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reinsert_resets_age() {
        let now = Utc::now();
        let mut cache: CoalescingCache<String, i32> = CoalescingCache::new(window());
        cache.insert("key".to_string(), 1, now);
        let later = now + Duration::milliseconds(1500);
        cache.insert("key".to_string(), 2, later);

        assert_eq!(cache.get_live(&"key".to_string(), later), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
