//! Exact-tier cache domain: fingerprints, entries, store contract, statistics

mod entry;
mod key;
mod repository;
mod stats;

pub use entry::{CacheEntry, CacheHit, CacheLookup, CacheSource};
pub use key::FingerprintDeriver;
pub use repository::{ResponseStore, StoreStats};
pub use stats::{CacheStatistics, CacheStatsSnapshot, estimate_tokens};

#[cfg(test)]
pub use repository::mock::MockResponseStore;
