//! Prometheus counters (default registry).

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

pub static RATE_CACHE_HITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "eventhub_rate_cache_hits_total",
        "Exchange-rate lookups served from the in-process cache"
    )
    .expect("register rate_cache_hits_total")
});

pub static RATE_CACHE_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "eventhub_rate_cache_misses_total",
        "Exchange-rate lookups not found or expired in the cache"
    )
    .expect("register rate_cache_misses_total")
});

pub static RATE_UPSTREAM_CALLS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "eventhub_rate_upstream_calls_total",
        "Calls made to the external exchange-rate API"
    )
    .expect("register rate_upstream_calls_total")
});

pub static RATE_UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "eventhub_rate_upstream_errors_total",
        "Failed calls to the external exchange-rate API"
    )
    .expect("register rate_upstream_errors_total")
});

pub static RATE_LIMITED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "eventhub_rate_limited_total",
        "Upstream rate lookups refused by the per-pair window"
    )
    .expect("register rate_limited_total")
});

pub static AI_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "eventhub_ai_actions_total",
        "Assistant actions by type and final status",
        &["action_type", "status"]
    )
    .expect("register ai_actions_total")
});
