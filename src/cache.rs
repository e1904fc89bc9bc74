//! Time-to-live cache
//!
//! Entries expire purely by age; there is no explicit invalidation. Expired
//! entries are treated as absent, evicted when read and swept on insert.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Map whose entries live for a fixed duration
///
/// # Examples
///
/// ```
/// use analyst_desk::cache::TtlCache;
/// use std::time::Duration;
///
/// let mut cache = TtlCache::new(Duration::from_secs(3600));
/// cache.insert("alice", vec!["How many medals?".to_string()]);
/// let (questions, _expires_at) = cache.get(&"alice").unwrap();
/// assert_eq!(questions.len(), 1);
/// ```
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (V, Instant)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value and expiry instant, if present and not expired
    pub fn get(&mut self, key: &K) -> Option<(V, Instant)> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`TtlCache::get`], evaluated at `now`
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<(V, Instant)> {
        let (_, expires_at) = self.entries.get(key)?;
        if now >= *expires_at {
            self.entries.remove(key);
            return None;
        }
        self.entries
            .get(key)
            .map(|(value, expires_at)| (value.clone(), *expires_at))
    }

    /// Store a value, replacing any previous entry; returns its expiry
    pub fn insert(&mut self, key: K, value: V) -> Instant {
        self.insert_at(key, value, Instant::now())
    }

    /// Same as [`TtlCache::insert`], stored as of `now`
    ///
    /// Entries already expired at `now` are dropped first.
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) -> Instant {
        self.entries.retain(|_, (_, expires_at)| now < *expires_at);
        let expires_at = now + self.ttl;
        self.entries.insert(key, (value, expires_at));
        expires_at
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_value_and_expiry() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        let expires = cache.insert_at("k", 1, now);
        assert_eq!(expires, now + Duration::from_secs(60));
        assert_eq!(cache.get_at(&"k", now), Some((1, expires)));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("k", 1, now);

        assert!(cache.get_at(&"k", now + Duration::from_secs(59)).is_some());
        assert!(cache.get_at(&"k", now + Duration::from_secs(60)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_and_refreshes() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let now = Instant::now();
        cache.insert_at("k", 1, now);
        cache.insert_at("k", 2, now + Duration::from_secs(8));

        let (value, _) = cache
            .get_at(&"k", now + Duration::from_secs(15))
            .expect("refreshed entry");
        assert_eq!(value, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_sweeps_expired_entries() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let now = Instant::now();
        cache.insert_at("gone", 1, now);
        cache.insert_at("kept", 2, now + Duration::from_secs(5));
        assert_eq!(cache.len(), 2);

        cache.insert_at("new", 3, now + Duration::from_secs(12));
        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(&"gone", now + Duration::from_secs(12)).is_none());
        assert_eq!(
            cache.get_at(&"kept", now + Duration::from_secs(12)).map(|(v, _)| v),
            Some(2)
        );
    }

    #[test]
    fn test_missing_key() {
        let mut cache: TtlCache<String, u8> = TtlCache::new(Duration::from_secs(1));
        assert!(cache.get(&"nobody".to_string()).is_none());
        assert_eq!(cache.ttl(), Duration::from_secs(1));
    }
}
