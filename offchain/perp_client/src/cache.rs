//! Expiring cache for slowly-changing contract configuration.
//!
//! The cache is an explicit object with an injected [`Clock`], handed to
//! whoever needs it. There is no process-wide cache.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now, "manual clock");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now, "manual clock")
    }
}

pub trait ConfigCache<K, V> {
    fn get(&self, key: &K) -> Option<V>;
    fn put(&self, key: K, value: V);
    fn clear(&self);
}

pub struct TtlCache<K, V, C = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K, V, C> TtlCache<K, V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self { ttl, clock, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        lock(&self.entries, "config cache").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, C> ConfigCache<K, V> for TtlCache<K, V, C>
where
    K: Eq + Hash + std::fmt::Debug,
    V: Clone,
    C: Clock,
{
    fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = lock(&self.entries, "config cache");
        let fresh = match entries.get(key) {
            Some((inserted, _)) => now.duration_since(*inserted) < self.ttl,
            None => {
                debug!(?key, "config cache miss");
                return None;
            }
        };
        if !fresh {
            debug!(?key, "config cache entry expired");
            entries.remove(key);
            return None;
        }
        debug!(?key, "config cache hit");
        entries.get(key).map(|(_, v)| v.clone())
    }

    fn put(&self, key: K, value: V) {
        let now = self.clock.now();
        lock(&self.entries, "config cache").insert(key, (now, value));
    }

    fn clear(&self) {
        lock(&self.entries, "config cache").clear();
    }
}

// recover from a poisoned mutex instead of panicking
fn lock<'a, T>(m: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match m.lock() {
        Ok(g) => g,
        Err(e) => {
            warn!("Recovered from poisoned mutex: {}", name);
            e.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_expire_after_ttl() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.put(1u64, "cfg");
        assert_eq!(cache.get(&1), Some("cfg"));

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&1), Some("cfg"));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_refreshes_and_clear_empties() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(10), clock.clone());
        cache.put(7u64, 1);
        clock.advance(Duration::from_secs(8));
        cache.put(7, 2);
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get(&7), Some(2));

        cache.put(8, 3);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.get(&7), None);
        assert_eq!(cache.get(&8), None);
    }

    #[test]
    fn test_system_clock_cache() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        cache.put("market", 42u32);
        assert_eq!(cache.get(&"market"), Some(42));
        assert_eq!(cache.get(&"other"), None);
    }
}
