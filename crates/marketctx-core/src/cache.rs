//! In-memory TTL caches for price series and fundamentals.
//!
//! Values are stored as `Arc<T>` snapshots and replaced wholesale on write,
//! so a reader either sees the previous value or the new one. Lookups take a
//! synchronous lock and never await. Failures are never cached: a miss after
//! a failed fetch simply fetches again.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use time::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::{PriceSeries, Symbol, TickerFundamentals, UtcDateTime};

/// Default lifetime of a cached daily series.
pub const SERIES_TTL: Duration = Duration::hours(24);
/// Default lifetime of cached fundamentals.
pub const FUNDAMENTALS_TTL: Duration = Duration::days(7);

#[derive(Debug)]
struct CacheEntry<T> {
    value: Arc<T>,
    fetched_at: UtcDateTime,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: UtcDateTime, ttl: Duration) -> bool {
        now.since(self.fetched_at) > ttl
    }
}

/// Thread-safe key/value store whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct TtlStore<T> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<Symbol, CacheEntry<T>>>,
}

impl<T> TtlStore<T> {
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A store with a non-positive TTL never retains anything.
    pub fn is_disabled(&self) -> bool {
        !self.ttl.is_positive()
    }

    /// Returns the cached value unless it is missing or expired.
    pub fn get(&self, key: &Symbol) -> Option<Arc<T>> {
        if self.is_disabled() {
            return None;
        }

        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => {
                debug!(cache = self.name, symbol = %key, "cache hit");
                Some(Arc::clone(&entry.value))
            }
            Some(_) => {
                debug!(cache = self.name, symbol = %key, "cache entry expired");
                None
            }
            None => {
                debug!(cache = self.name, symbol = %key, "cache miss");
                None
            }
        }
    }

    /// Stores `value`, replacing any previous entry, and returns the shared snapshot.
    pub fn put(&self, key: Symbol, value: T) -> Arc<T> {
        let value = Arc::new(value);
        if self.is_disabled() {
            return value;
        }

        let entry = CacheEntry {
            value: Arc::clone(&value),
            fetched_at: self.clock.now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
        value
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, entry| !entry.is_expired(now, ttl));
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two process-wide stores used by the engine.
#[derive(Debug)]
pub struct MarketCache {
    pub series: TtlStore<PriceSeries>,
    pub fundamentals: TtlStore<TickerFundamentals>,
}

impl MarketCache {
    pub fn new(series_ttl: Duration, fundamentals_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            series: TtlStore::new("series", series_ttl, Arc::clone(&clock)),
            fundamentals: TtlStore::new("fundamentals", fundamentals_ttl, clock),
        }
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(SERIES_TTL, FUNDAMENTALS_TTL, clock)
    }

    pub fn clear(&self) {
        self.series.clear();
        self.fundamentals.clear();
    }
}

impl Default for MarketCache {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ProviderId;

    fn store(ttl: Duration) -> (TtlStore<TickerFundamentals>, ManualClock) {
        let clock = ManualClock::default();
        let store = TtlStore::new("test", ttl, Arc::new(clock.clone()));
        (store, clock)
    }

    fn key(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn record(raw: &str) -> TickerFundamentals {
        TickerFundamentals::empty(key(raw), ProviderId::Yahoo)
    }

    #[test]
    fn returns_entry_until_ttl_elapses() {
        let (store, clock) = store(Duration::hours(24));
        store.put(key("AAPL"), record("AAPL"));

        clock.advance(Duration::hours(24));
        assert!(store.get(&key("AAPL")).is_some(), "entry at exactly TTL is fresh");

        clock.advance(Duration::seconds(1));
        assert!(store.get(&key("AAPL")).is_none(), "entry past TTL is a miss");
    }

    #[test]
    fn put_replaces_previous_value() {
        let (store, _) = store(Duration::hours(1));
        store.put(key("AAPL"), record("AAPL"));

        let mut updated = record("AAPL");
        updated.beta = Some(1.2);
        store.put(key("AAPL"), updated);

        let cached = store.get(&key("AAPL")).expect("cached");
        assert_eq!(cached.beta, Some(1.2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn purge_expired_keeps_fresh_entries() {
        let (store, clock) = store(Duration::hours(1));
        store.put(key("AAPL"), record("AAPL"));
        clock.advance(Duration::minutes(45));
        store.put(key("MSFT"), record("MSFT"));
        clock.advance(Duration::minutes(30));

        store.purge_expired();

        assert_eq!(store.len(), 1);
        assert!(store.get(&key("MSFT")).is_some());
    }

    #[test]
    fn zero_ttl_disables_store() {
        let (store, _) = store(Duration::ZERO);
        assert!(store.is_disabled());

        store.put(key("AAPL"), record("AAPL"));

        assert!(store.get(&key("AAPL")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn default_ttls_match_data_granularity() {
        let cache = MarketCache::default();
        assert_eq!(cache.series.ttl(), Duration::hours(24));
        assert_eq!(cache.fundamentals.ttl(), Duration::days(7));
    }

    #[test]
    fn concurrent_writers_never_tear_values() {
        let (store, _) = store(Duration::hours(1));
        let store = Arc::new(store);

        let handles = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let mut value = record("AAPL");
                        value.beta = Some(f64::from(i));
                        value.pe_ratio = Some(f64::from(i));
                        store.put(key("AAPL"), value);
                        let seen = store.get(&key("AAPL")).expect("present");
                        assert_eq!(seen.beta, seen.pe_ratio);
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().expect("writer thread should not panic");
        }
        assert_eq!(store.len(), 1);
    }
}
