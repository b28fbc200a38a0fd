//! In-process exchange-rate cache.
//!
//! Entries expire after `ttl`. Independently, each currency pair carries the
//! instant of its last upstream call so callers can space out requests to the
//! external API (`window`). Both checks are best-effort and local to this
//! process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::metrics;

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    value: Decimal,
    stored_at: Instant,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_secs: u64,
    pub rate_limit_window_secs: u64,
}

#[derive(Debug)]
pub struct ExchangeRateCache {
    entries: DashMap<String, CacheEntry>,
    last_upstream: DashMap<String, Instant>,
    ttl: Duration,
    window: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExchangeRateCache {
    pub fn new(ttl: Duration, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            last_upstream: DashMap::new(),
            ttl,
            window,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(cfg: &configs::CurrencyConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.cache_ttl_secs),
            Duration::from_secs(cfg.rate_limit_window_secs),
        )
    }

    /// Cache key for a currency pair, e.g. `KES_USD`.
    pub fn key(from: &str, to: &str) -> String {
        format!("{}_{}", from.trim().to_uppercase(), to.trim().to_uppercase())
    }

    /// Fresh value for `key`, or `None` when absent or older than the TTL.
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.get_at(key, Instant::now())
    }

    /// `get` against an explicit clock.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Decimal> {
        let fresh = self
            .entries
            .get(key)
            .filter(|e| now.saturating_duration_since(e.stored_at) < self.ttl)
            .map(|e| e.value);
        match fresh {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::RATE_CACHE_HITS_TOTAL.inc();
                debug!(%key, "rate cache hit");
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                metrics::RATE_CACHE_MISSES_TOTAL.inc();
                debug!(%key, "rate cache miss");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: Decimal) {
        self.set_at(key, value, Instant::now());
    }

    pub fn set_at(&self, key: &str, value: Decimal, now: Instant) {
        self.entries.insert(key.to_string(), CacheEntry { value, stored_at: now });
    }

    /// Last stored value regardless of age.
    pub fn get_stale(&self, key: &str) -> Option<Decimal> {
        self.entries.get(key).map(|e| e.value)
    }

    /// Whether the pair may hit the upstream API now.
    pub fn can_call_upstream(&self, pair: &str) -> bool {
        self.can_call_upstream_at(pair, Instant::now())
    }

    pub fn can_call_upstream_at(&self, pair: &str, now: Instant) -> bool {
        match self.last_upstream.get(pair) {
            Some(last) => now.saturating_duration_since(*last) >= self.window,
            None => true,
        }
    }

    pub fn mark_upstream_call(&self, pair: &str) {
        self.mark_upstream_call_at(pair, Instant::now());
    }

    pub fn mark_upstream_call_at(&self, pair: &str, now: Instant) {
        self.last_upstream.insert(pair.to_string(), now);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.last_upstream.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
            rate_limit_window_secs: self.window.as_secs(),
        }
    }
}

impl Default for ExchangeRateCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn key_is_upper_pair() {
        assert_eq!(ExchangeRateCache::key("kes", " usd"), "KES_USD");
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = ExchangeRateCache::new(Duration::from_secs(60), Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set_at("KES_USD", rate("0.0077"), t0);
        assert_eq!(cache.get_at("KES_USD", t0 + Duration::from_secs(59)), Some(rate("0.0077")));
        assert_eq!(cache.get_at("KES_USD", t0 + Duration::from_secs(60)), None);
        // stale value is still reachable
        assert_eq!(cache.get_stale("KES_USD"), Some(rate("0.0077")));
    }

    #[test]
    fn set_overwrites_and_refreshes() {
        let cache = ExchangeRateCache::new(Duration::from_secs(60), Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set_at("KES_EUR", rate("0.007"), t0);
        cache.set_at("KES_EUR", rate("0.0071"), t0 + Duration::from_secs(50));
        assert_eq!(cache.get_at("KES_EUR", t0 + Duration::from_secs(100)), Some(rate("0.0071")));
    }

    #[test]
    fn upstream_window_per_pair() {
        let cache = ExchangeRateCache::new(Duration::from_secs(3600), Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(cache.can_call_upstream_at("KES_USD", t0));
        cache.mark_upstream_call_at("KES_USD", t0);
        assert!(!cache.can_call_upstream_at("KES_USD", t0 + Duration::from_secs(9)));
        assert!(cache.can_call_upstream_at("KES_GBP", t0 + Duration::from_secs(1)));
        assert!(cache.can_call_upstream_at("KES_USD", t0 + Duration::from_secs(10)));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let cache = ExchangeRateCache::default();
        cache.set("USD_EUR", rate("0.92"));
        let _ = cache.get("USD_EUR");
        let _ = cache.get("USD_JPY");
        let s = cache.stats();
        assert_eq!((s.entries, s.hits, s.misses), (1, 1, 1));
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
        assert!(cache.can_call_upstream("USD_EUR"));
    }
}
