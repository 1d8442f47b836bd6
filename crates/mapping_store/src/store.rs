//! Temporal mapping store.
//!
//! Uses `DashMap` so reads from the transform path never wait on the whole
//! map; a sweep or a refresh batch only locks one shard at a time.
//!
//! Freshness is enforced by the sweep alone, never on read. An entry written
//! at `t` is evicted by the first sweep after `t + max_age`, so `get` can
//! return it for up to `max_age + sweep_interval`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::task::{PeriodicTask, MIN_PERIOD};

#[derive(Debug)]
struct MappingEntry {
    value: String,
    written_at: Instant,
}

type Entries = Arc<DashMap<String, MappingEntry>>;

/// Thread-safe id → label cache with age-based background eviction.
#[derive(Debug)]
pub struct TemporalMappingStore {
    entries: Entries,
    max_age: Duration,
    sweep_interval: Duration,
    sweeper: Mutex<Option<PeriodicTask>>,
}

impl TemporalMappingStore {
    /// Create the store and start its sweeper on the current Tokio runtime.
    ///
    /// A zero `sweep_interval` is clamped to [`MIN_PERIOD`]. Panics when
    /// called outside a runtime.
    pub fn new(max_age: Duration, sweep_interval: Duration) -> Self {
        let sweep_interval = sweep_interval.max(MIN_PERIOD);
        let entries: Entries = Arc::new(DashMap::new());

        let sweep_entries = entries.clone();
        let sweeper = PeriodicTask::spawn_delayed(sweep_interval, move || {
            let entries = sweep_entries.clone();
            async move {
                let evicted = sweep_expired(&entries, max_age);
                if evicted > 0 {
                    debug!(
                        "Evicted {} mapping(s) older than {}ms, {} left",
                        evicted,
                        max_age.as_millis(),
                        entries.len()
                    );
                }
            }
        });

        Self {
            entries,
            max_age,
            sweep_interval,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Insert or overwrite `key`, stamping it with the current time.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(
            key.into(),
            MappingEntry {
                value: value.into(),
                written_at: Instant::now(),
            },
        );
    }

    /// Current value for `key`, or `None` if it was never set or has been
    /// swept. Does not check the entry's age.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Worst-case age at which `get` can still return an entry.
    pub fn max_served_age(&self) -> Duration {
        self.max_age + self.sweep_interval
    }

    /// True until [`destroy`](Self::destroy) is called.
    pub fn has_active_sweeper(&self) -> bool {
        self.sweeper_slot().is_some()
    }

    /// Stop background eviction. Safe to call repeatedly; returns true only
    /// for the call that actually stopped the sweeper.
    ///
    /// `get` and `set` keep working afterwards, entries just no longer expire.
    pub fn destroy(&self) -> bool {
        match self.sweeper_slot().take() {
            Some(sweeper) => {
                sweeper.cancel();
                true
            }
            None => false,
        }
    }

    fn sweeper_slot(&self) -> MutexGuard<'_, Option<PeriodicTask>> {
        // The slot is only ever swapped to None, so a poisoned guard is still valid.
        self.sweeper.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for TemporalMappingStore {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Remove every entry whose age exceeds `max_age`. Returns how many were removed.
fn sweep_expired(entries: &DashMap<String, MappingEntry>, max_age: Duration) -> usize {
    let now = Instant::now();
    let mut evicted = 0;
    entries.retain(|_, entry| {
        let keep = now.saturating_duration_since(entry.written_at) <= max_age;
        if !keep {
            evicted += 1;
        }
        keep
    });
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_AGE: Duration = Duration::from_secs(10);
    const SWEEP: Duration = Duration::from_secs(5);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        store.set("1", "FOOTBALL");

        assert_eq!(store.get("1").as_deref(), Some("FOOTBALL"));
        assert_eq!(store.get("2"), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_value_and_timestamp() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        store.set("1", "FOOTBALL");

        // Refresh at 8s keeps the key alive past the 15s sweep.
        tokio::time::sleep(ms(8_000)).await;
        store.set("1", "SOCCER");
        tokio::time::sleep(ms(8_000)).await;

        assert_eq!(store.get("1").as_deref(), Some("SOCCER"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_served_until_first_sweep_past_max_age() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        store.set("1", "FOOTBALL");

        // Sweeps run at 5s, 10s, 15s. At 10s the entry is exactly max_age
        // old, which is not yet expired.
        tokio::time::sleep(ms(14_500)).await;
        assert_eq!(store.get("1").as_deref(), Some("FOOTBALL"));
        assert!(ms(14_500) <= store.max_served_age());

        tokio::time::sleep(ms(1_000)).await;
        assert_eq!(store.get("1"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_only_removes_expired_entries() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        store.set("old", "A");
        tokio::time::sleep(ms(8_000)).await;
        store.set("fresh", "B");

        // Sweep at 15s: "old" is 15s old, "fresh" 7s.
        tokio::time::sleep(ms(7_500)).await;
        assert_eq!(store.get("old"), None);
        assert_eq!(store.get("fresh").as_deref(), Some("B"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_expired_counts_evictions() {
        let store = TemporalMappingStore::new(MAX_AGE, Duration::from_secs(3600));
        store.set("a", "A");
        store.set("b", "B");
        tokio::time::advance(ms(11_000)).await;
        store.set("c", "C");

        assert_eq!(sweep_expired(&store.entries, MAX_AGE), 2);
        assert_eq!(sweep_expired(&store.entries, MAX_AGE), 0);
        assert_eq!(store.get("c").as_deref(), Some("C"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_does_not_mutate() {
        let store = TemporalMappingStore::new(MAX_AGE, Duration::from_secs(3600));
        store.set("a", "A");
        tokio::time::advance(ms(60_000)).await;

        // Long past max_age, but no sweep has run.
        assert_eq!(store.get("a").as_deref(), Some("A"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_sweep_interval_does_not_panic() {
        let store = TemporalMappingStore::new(ms(50), Duration::ZERO);
        store.set("a", "A");
        assert_eq!(store.max_served_age(), ms(51));

        tokio::time::sleep(ms(60)).await;
        assert_eq!(store.get("a"), None);
        assert!(store.destroy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_is_idempotent() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        assert!(store.has_active_sweeper());

        assert!(store.destroy());
        assert!(!store.destroy());
        assert!(!store.has_active_sweeper());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_usable_after_destroy_without_eviction() {
        let store = TemporalMappingStore::new(MAX_AGE, SWEEP);
        store.set("1", "FOOTBALL");
        store.destroy();

        tokio::time::sleep(ms(60_000)).await;
        assert_eq!(store.get("1").as_deref(), Some("FOOTBALL"));

        store.set("2", "BASKETBALL");
        assert_eq!(store.get("2").as_deref(), Some("BASKETBALL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_writers_and_sweeps() {
        let store = Arc::new(TemporalMappingStore::new(MAX_AGE, ms(1)));
        let mut handles = Vec::new();
        for worker in 0..4 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    store.set(format!("{worker}-{i}"), format!("label-{i}"));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.expect("writer should not panic");
        }

        assert_eq!(store.len(), 400);
        assert_eq!(store.get("3-99").as_deref(), Some("label-99"));
    }
}
