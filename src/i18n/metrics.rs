//! Translation metrics and observability module.
//!
//! Counts cache hits, misses, coalesced requests, API calls and API failures.
//! Each translator stack owns its own `TranslationMetrics` behind an `Arc`, so
//! isolated stacks (and tests) never see each other's counts.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Translation counters.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Number of lookups answered by the cache
    cache_hits: AtomicUsize,

    /// Number of lookups not found in the cache
    cache_misses: AtomicUsize,

    /// Number of misses that joined a request already queued or in flight
    coalesced: AtomicUsize,

    /// Number of HTTP calls made to the translation API
    api_calls: AtomicUsize,

    /// Number of HTTP calls that failed (the caller got original text back)
    api_failures: AtomicUsize,
}

impl TranslationMetrics {
    /// Create a zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a miss that was merged into an existing request.
    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an API call to the translation service.
    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an API call failure.
    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current cache hit count.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Get the current cache miss count.
    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Get the current coalesced request count.
    pub fn coalesced(&self) -> usize {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Get the current API call count.
    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    /// Get the current API failure count.
    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            coalesced: self.coalesced(),
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of cache hits
    pub cache_hits: usize,

    /// Number of cache misses
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    /// Number of coalesced requests
    pub coalesced: usize,

    /// Number of API calls made
    pub api_calls: usize,

    /// Number of API failures
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,
}
