//! Cache hit/miss accounting
//!
//! Counters are process-lifetime scoped and monotonic until reset. They are
//! plain relaxed atomics: totals may be momentarily inconsistent while other
//! threads record, which is acceptable for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Rough token estimate for a piece of text, ~4 chars per token.
///
/// Used only to size the "tokens saved" counters; it is an estimate, not a
/// tokenizer.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;

    if chars == 0 {
        0
    } else {
        (chars / 4).max(1)
    }
}

/// Thread-safe cache counters
#[derive(Debug, Default)]
pub struct CacheStatistics {
    exact_hits: AtomicU64,
    similarity_hits: AtomicU64,
    misses: AtomicU64,
    tokens_saved_exact: AtomicU64,
    tokens_saved_similarity: AtomicU64,
}

impl CacheStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_exact_hit(&self, response: &str) {
        self.exact_hits.fetch_add(1, Ordering::Relaxed);
        self.tokens_saved_exact
            .fetch_add(estimate_tokens(response), Ordering::Relaxed);
    }

    pub fn record_similarity_hit(&self, response: &str) {
        self.similarity_hits.fetch_add(1, Ordering::Relaxed);
        self.tokens_saved_similarity
            .fetch_add(estimate_tokens(response), Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.exact_hits.store(0, Ordering::Relaxed);
        self.similarity_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.tokens_saved_exact.store(0, Ordering::Relaxed);
        self.tokens_saved_similarity.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let exact_hits = self.exact_hits.load(Ordering::Relaxed);
        let similarity_hits = self.similarity_hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total_requests = exact_hits + similarity_hits + misses;

        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            (exact_hits + similarity_hits) as f64 / total_requests as f64
        };

        CacheStatsSnapshot {
            total_requests,
            exact_hits,
            similarity_hits,
            misses,
            hit_rate,
            tokens_saved_exact: self.tokens_saved_exact.load(Ordering::Relaxed),
            tokens_saved_similarity: self.tokens_saved_similarity.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub total_requests: u64,
    pub exact_hits: u64,
    pub similarity_hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub tokens_saved_exact: u64,
    pub tokens_saved_similarity: u64,
}
