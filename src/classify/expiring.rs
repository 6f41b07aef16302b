//! Time-stamped map with amortized expiry
//!
//! One reusable primitive behind every short-lived cache in the classifier:
//! thrown-release windows, elemental windows, sliced-part credit. Entries are
//! fresh within `horizon` seconds of their stamp; sweeps run at most once per
//! `SWEEP_INTERVAL` and purge anything older than twice the horizon.

use std::collections::HashMap;
use std::hash::Hash;

/// Seconds between amortized sweeps.
const SWEEP_INTERVAL: f32 = 5.0;

/// Entries older than this multiple of the horizon are garbage.
const STALE_FACTOR: f32 = 2.0;

#[derive(Debug, Clone)]
struct Stamped<V> {
    stamp: f32,
    value: V,
}

/// Map whose entries expire `horizon` seconds after their last refresh.
#[derive(Debug, Clone)]
pub struct ExpiringMap<K, V> {
    horizon: f32,
    last_sweep: f32,
    entries: HashMap<K, Stamped<V>>,
}

impl<K: Eq + Hash, V> ExpiringMap<K, V> {
    pub fn new(horizon: f32) -> Self {
        Self {
            horizon: horizon.max(0.0),
            last_sweep: 0.0,
            entries: HashMap::new(),
        }
    }

    pub fn horizon(&self) -> f32 {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace, stamping the entry at `now`.
    pub fn insert(&mut self, key: K, value: V, now: f32) {
        self.entries.insert(key, Stamped { stamp: now, value });
        self.maybe_sweep(now);
    }

    /// Re-stamp the entry at `now` and return its value for mutation,
    /// inserting a fresh one first if absent. This is the
    /// refresh-and-accumulate path: one live entry per key, never a
    /// duplicate.
    pub fn refresh_or_insert_with(
        &mut self,
        key: K,
        now: f32,
        init: impl FnOnce() -> V,
    ) -> &mut V {
        self.maybe_sweep(now);
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Stamped { stamp: now, value: init() });
        entry.stamp = now;
        &mut entry.value
    }

    /// Whether a fresh (non-expired) entry exists for `key`.
    pub fn contains_fresh(&self, key: &K, now: f32) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| now - e.stamp <= self.horizon)
    }

    /// Consume the entry for `key`. Returns the value only when the entry
    /// was still fresh; a stale entry is dropped and yields `None`. Either
    /// way the entry is gone afterwards, so a window can be claimed at most
    /// once.
    pub fn take_fresh(&mut self, key: &K, now: f32) -> Option<V> {
        let stamped = self.entries.remove(key)?;
        if now - stamped.stamp <= self.horizon {
            Some(stamped.value)
        } else {
            None
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|s| s.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries older than twice the horizon. Amortized: no-op unless
    /// `SWEEP_INTERVAL` has elapsed since the last sweep.
    pub fn maybe_sweep(&mut self, now: f32) {
        if now - self.last_sweep < SWEEP_INTERVAL {
            return;
        }
        self.last_sweep = now;
        let deadline = self.horizon * STALE_FACTOR;
        self.entries.retain(|_, e| now - e.stamp <= deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_within_horizon() {
        let mut map: ExpiringMap<u32, &str> = ExpiringMap::new(10.0);
        map.insert(1, "window", 0.0);
        assert!(map.contains_fresh(&1, 9.9));
        assert!(map.contains_fresh(&1, 10.0));
        assert!(!map.contains_fresh(&1, 10.1));
    }

    #[test]
    fn test_take_fresh_consumes() {
        let mut map: ExpiringMap<u32, u8> = ExpiringMap::new(5.0);
        map.insert(1, 7, 0.0);
        assert_eq!(map.take_fresh(&1, 4.0), Some(7));
        // Second claim finds nothing.
        assert_eq!(map.take_fresh(&1, 4.0), None);
    }

    #[test]
    fn test_take_stale_yields_none_and_purges() {
        let mut map: ExpiringMap<u32, u8> = ExpiringMap::new(5.0);
        map.insert(1, 7, 0.0);
        assert_eq!(map.take_fresh(&1, 5.1), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_refresh_accumulates_without_duplicates() {
        let mut map: ExpiringMap<u32, f32> = ExpiringMap::new(5.0);
        *map.refresh_or_insert_with(1, 0.0, || 0.0) += 10.0;
        *map.refresh_or_insert_with(1, 3.0, || 0.0) += 5.0;
        assert_eq!(map.len(), 1);
        // Stamp refreshed at 3.0, so still fresh at 7.0.
        assert_eq!(map.take_fresh(&1, 7.0), Some(15.0));
    }

    #[test]
    fn test_amortized_sweep_purges_garbage() {
        let mut map: ExpiringMap<u32, ()> = ExpiringMap::new(2.0);
        map.insert(1, (), 0.0);
        map.insert(2, (), 0.0);
        // Stale entries linger until a sweep actually runs.
        map.maybe_sweep(3.0);
        assert_eq!(map.len(), 2);
        map.maybe_sweep(6.0);
        assert!(map.is_empty());
    }
}
