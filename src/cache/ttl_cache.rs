//! In-process keyed cache with per-entry expiry.
//!
//! Entries live in a [`DashMap`], so reads and writes of a given key are atomic
//! with respect to each other. Expiry is decided against an injected
//! [`Clock`]: an entry is served only while `now < expiry`.

use super::clock::{add_duration, Clock, SystemClock};
use crate::config::CacheTypeConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub data: V,
    pub expiry: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

/// Point-in-time counters for a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Anything that can drop its expired entries on a periodic sweep
pub trait ExpiredSweep: Send + Sync {
    fn name(&self) -> &str;
    fn clean_expired(&self) -> usize;
}

#[derive(Debug)]
pub struct TtlCache<V> {
    name: String,
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    /// Soft bound; concurrent inserts may briefly overshoot it. Zero disables storage.
    max_entries: usize,
    clock: Arc<dyn Clock>,
    counters: CacheCounters,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: impl Into<String>, default_ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(name, default_ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        default_ttl: Duration,
        max_entries: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            default_ttl,
            max_entries,
            clock,
            counters: CacheCounters::default(),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &CacheTypeConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(name, config.ttl_duration(), config.max_entries, clock)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Cached data for `key`, or `None` when absent or expired.
    ///
    /// An expired entry is evicted on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.data.clone()));

        match lookup {
            Some(Some(data)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = key, "Cache hit");
                Some(data)
            }
            Some(None) => {
                // Re-check under the shard lock; a concurrent set may have refreshed it
                if self
                    .entries
                    .remove_if(key, |_, entry| entry.is_expired(now))
                    .is_some()
                {
                    self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = key, "Cache miss (expired)");
                None
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = key, "Cache miss");
                None
            }
        }
    }

    /// Store `data` under `key` with the cache's default TTL
    pub fn insert(&self, key: impl Into<String>, data: V) {
        self.set(key, data, self.default_ttl);
    }

    /// Store `data` under `key`, expiring `ttl` from now. Overwrites any
    /// existing entry.
    pub fn set(&self, key: impl Into<String>, data: V, ttl: Duration) {
        if self.max_entries == 0 {
            return;
        }

        let key = key.into();
        let now = self.clock.now();

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.make_room(now);
        }

        debug!(cache = %self.name, key = %key, ttl_seconds = ttl.as_secs(), "Cached entry");
        self.entries.insert(
            key,
            CacheEntry {
                data,
                expiry: add_duration(now, ttl),
                created_at: now,
            },
        );
    }

    /// Remove `key`; returns whether an entry was present
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(cache = %self.name, key = key, "Invalidated cache entry");
        }
        removed
    }

    /// Remove every entry whose key satisfies `predicate`; returns the count
    pub fn delete_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&str) -> bool,
    {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let matched = predicate(key);
            if matched {
                removed += 1;
            }
            !matched
        });
        if removed > 0 {
            debug!(cache = %self.name, removed = removed, "Invalidated matching cache entries");
        }
        removed
    }

    /// Remove every entry whose key starts with `prefix`
    pub fn delete_prefix(&self, prefix: &str) -> usize {
        self.delete_where(|key| key.starts_with(prefix))
    }

    pub fn clear(&self) {
        self.entries.clear();
        info!(cache = %self.name, "Cleared cache");
    }

    /// Drop every entry whose expiry has passed; returns the count.
    ///
    /// Each shard is checked under its write lock, so an entry refreshed by a
    /// concurrent `set` is judged on its new expiry.
    pub fn clean_expired(&self) -> usize {
        let now = self.clock.now();
        self.clean_expired_at(now)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    fn clean_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let expired = entry.is_expired(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        if removed > 0 {
            self.counters
                .evictions
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!(cache = %self.name, removed = removed, "Swept expired cache entries");
        }
        removed
    }

    /// Free one slot: sweep expired entries, then evict the entry closest to expiry
    fn make_room(&self, now: DateTime<Utc>) {
        if self.clean_expired_at(now) > 0 && self.entries.len() < self.max_entries {
            return;
        }

        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expiry)
            .map(|entry| entry.key().clone());

        if let Some(victim) = victim {
            if self.entries.remove(&victim).is_some() {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = %victim, "Evicted entry to stay within capacity");
            }
        }
    }
}

impl<V: Clone + Send + Sync> ExpiredSweep for TtlCache<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn clean_expired(&self) -> usize {
        TtlCache::clean_expired(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use chrono::TimeZone;

    fn cache(max_entries: usize) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let cache = TtlCache::with_clock("test", Duration::from_secs(60), max_entries, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (cache, _) = cache(10);
        cache.set("rooms?floor=2", "payload".to_string(), Duration::from_secs(30));
        assert_eq!(cache.get("rooms?floor=2"), Some("payload".to_string()));
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let (cache, clock) = cache(10);
        cache.set("k", "v".to_string(), Duration::from_secs(30));

        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get("k"), Some("v".to_string()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty(), "expired entry should be evicted on access");
    }

    #[test]
    fn test_set_overwrites_and_refreshes_expiry() {
        let (cache, clock) = cache(10);
        cache.set("k", "old".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        cache.set("k", "new".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("k"), Some("new".to_string()));
    }

    #[test]
    fn test_clean_expired_counts_removed() {
        let (cache, clock) = cache(10);
        cache.set("short-1", "a".to_string(), Duration::from_secs(5));
        cache.set("short-2", "b".to_string(), Duration::from_secs(5));
        cache.set("long", "c".to_string(), Duration::from_secs(500));

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.clean_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clean_expired(), 0);
    }

    #[test]
    fn test_clean_expired_keeps_refreshed_entry() {
        let (cache, clock) = cache(10);
        cache.set("k", "old".to_string(), Duration::from_secs(5));
        clock.advance(Duration::from_secs(5));

        cache.set("k", "new".to_string(), Duration::from_secs(5));
        assert_eq!(cache.clean_expired(), 0);
        assert_eq!(cache.get("k"), Some("new".to_string()));
    }

    #[test]
    fn test_concurrent_sweep_never_drops_refreshed_entries() {
        use std::sync::atomic::AtomicBool;

        let (cache, clock) = cache(1_000);
        for i in 0..500 {
            cache.set(format!("k{i}"), "stale".to_string(), Duration::from_secs(1));
        }
        clock.advance(Duration::from_secs(2));

        let refreshing = AtomicBool::new(true);
        std::thread::scope(|scope| {
            for _ in 0..2 {
                scope.spawn(|| {
                    while refreshing.load(Ordering::Acquire) {
                        cache.clean_expired();
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..500 {
                    cache.set(format!("k{i}"), "fresh".to_string(), Duration::from_secs(3600));
                }
                refreshing.store(false, Ordering::Release);
            });
        });

        cache.clean_expired();
        assert_eq!(cache.len(), 500);
        for i in 0..500 {
            assert_eq!(cache.get(&format!("k{i}")), Some("fresh".to_string()));
        }
    }

    #[test]
    fn test_delete_and_clear() {
        let (cache, _) = cache(10);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_prefix() {
        let (cache, _) = cache(10);
        cache.insert("/bookings?page=1", "a".to_string());
        cache.insert("/bookings?page=2", "b".to_string());
        cache.insert("/rooms", "c".to_string());

        assert_eq!(cache.delete_prefix("/bookings"), 2);
        assert_eq!(cache.get("/rooms"), Some("c".to_string()));
    }

    #[test]
    fn test_capacity_evicts_soonest_expiring() {
        let (cache, _) = cache(2);
        cache.set("soon", "a".to_string(), Duration::from_secs(10));
        cache.set("later", "b".to_string(), Duration::from_secs(100));
        cache.set("newest", "c".to_string(), Duration::from_secs(50));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("soon"), None);
        assert!(cache.get("later").is_some());
        assert!(cache.get("newest").is_some());
    }

    #[test]
    fn test_capacity_prefers_sweeping_expired() {
        let (cache, clock) = cache(2);
        cache.set("stale", "a".to_string(), Duration::from_secs(1));
        cache.set("fresh", "b".to_string(), Duration::from_secs(100));
        clock.advance(Duration::from_secs(2));
        cache.set("new", "c".to_string(), Duration::from_secs(10));

        assert!(cache.get("fresh").is_some());
        assert!(cache.get("new").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_storage() {
        let (cache, _) = cache(0);
        cache.insert("k", "v".to_string());
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_stats_track_hits_misses_and_evictions() {
        let (cache, clock) = cache(10);
        cache.set("k", "v".to_string(), Duration::from_secs(5));
        cache.get("k");
        cache.get("missing");
        clock.advance(Duration::from_secs(5));
        cache.get("k");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 0);
    }
}
