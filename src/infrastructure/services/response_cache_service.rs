//! Two-tier response cache orchestrator
//!
//! Sequences lookups across the exact store and the similarity index. Every
//! failure below this layer is absorbed here: reads degrade to a miss and
//! writes are logged and skipped, so callers can treat the cache purely as a
//! performance optimization.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::domain::cache::{
    CacheEntry, CacheLookup, CacheStatistics, CacheStatsSnapshot, FingerprintDeriver,
    ResponseStore, StoreStats,
};
use crate::domain::request::GenerationRequest;
use crate::domain::similarity::SimilarityIndex;
use crate::infrastructure::similarity::MinHashLshIndex;
use crate::infrastructure::store::DiskResponseStore;

/// Length cap for the human-readable request preview stored next to each
/// record.
const DEBUG_KEY_CHARS: usize = 120;

/// The two-tier response cache.
///
/// Owned explicitly by the calling service with its lifecycle tied to
/// application startup/shutdown; construction never fails. If the backing
/// directory cannot be created the whole cache silently becomes a
/// pass-through, and if the similarity backend rejects its parameters only
/// the approximate tier is dropped.
#[derive(Debug)]
pub struct ResponseCacheService {
    config: CacheConfig,
    deriver: FingerprintDeriver,
    store: Option<Arc<dyn ResponseStore>>,
    similarity: Option<Arc<dyn SimilarityIndex>>,
    stats: CacheStatistics,
}

impl ResponseCacheService {
    /// Builds the disk store and similarity index described by `config`,
    /// downgrading gracefully when either is unavailable.
    pub fn new(config: CacheConfig) -> Self {
        let store: Option<Arc<dyn ResponseStore>> =
            match DiskResponseStore::try_new(&config.cache_dir) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!(error = %e, "response cache disabled, requests pass through");
                    None
                }
            };

        let similarity: Option<Arc<dyn SimilarityIndex>> =
            if store.is_some() && config.enable_similarity {
                match MinHashLshIndex::try_new(config.similarity_threshold, config.num_perm) {
                    Ok(index) => Some(Arc::new(index)),
                    Err(e) => {
                        warn!(error = %e, "similarity tier disabled, exact tier still active");
                        None
                    }
                }
            } else {
                None
            };

        Self::with_backends(config, store, similarity)
    }

    /// Wires the service onto explicit backends. `None` for the store means
    /// the cache is fully disabled; `None` for the index means exact-only.
    pub fn with_backends(
        config: CacheConfig,
        store: Option<Arc<dyn ResponseStore>>,
        similarity: Option<Arc<dyn SimilarityIndex>>,
    ) -> Self {
        Self {
            config,
            deriver: FingerprintDeriver::new(),
            store,
            similarity,
            stats: CacheStatistics::new(),
        }
    }

    /// Whether the exact tier is operational.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Whether the similarity tier is operational.
    pub fn similarity_enabled(&self) -> bool {
        self.similarity.is_some()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Looks up a request: exact tier first, then (when enabled) the
    /// similarity tier. Never raises; every internal failure is reported as
    /// a miss.
    pub async fn get(&self, request: &GenerationRequest) -> CacheLookup {
        let Some(store) = &self.store else {
            return CacheLookup::Miss;
        };

        let fingerprint = self.deriver.fingerprint(request);

        match store.get(&fingerprint).await {
            Ok(Some(entry)) => {
                debug!(%fingerprint, "exact cache hit");
                self.stats.record_exact_hit(entry.response());
                return CacheLookup::exact(entry.into_response());
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%fingerprint, error = %e, "exact lookup failed, treating as miss");
            }
        }

        if let Some(index) = &self.similarity {
            let text = request.combined_text();

            if !text.is_empty() {
                if let Some(response) = self.resolve_similar(store, index, &text).await {
                    self.stats.record_similarity_hit(&response);
                    return CacheLookup::similar(response);
                }
            }
        }

        debug!(%fingerprint, "cache miss");
        self.stats.record_miss();
        CacheLookup::Miss
    }

    /// Probes the similarity index and re-reads the candidate's payload from
    /// the exact store. A candidate whose entry has expired or vanished, and
    /// any error along the way, degrades to a miss; a fresh `put` from the
    /// caller repairs the cache naturally.
    async fn resolve_similar(
        &self,
        store: &Arc<dyn ResponseStore>,
        index: &Arc<dyn SimilarityIndex>,
        text: &str,
    ) -> Option<String> {
        let candidate = match index.find_similar(text).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "similarity probe failed, treating as miss");
                return None;
            }
        };

        match store.get(&candidate).await {
            Ok(Some(entry)) => {
                debug!(candidate = %candidate, "similarity cache hit");
                Some(entry.into_response())
            }
            Ok(None) => {
                debug!(candidate = %candidate, "similarity candidate no longer live");
                None
            }
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "similarity candidate unreadable");
                None
            }
        }
    }

    /// Writes through both tiers. The exact store always gets the record;
    /// the similarity index is updated only while below its configured
    /// maximum size. Failures are logged, never raised.
    pub async fn put(&self, request: &GenerationRequest, response: &str) {
        let Some(store) = &self.store else {
            return;
        };

        let fingerprint = self.deriver.fingerprint(request);
        let text = request.combined_text();
        let preview: String = text.chars().take(DEBUG_KEY_CHARS).collect();

        let entry = CacheEntry::new(&fingerprint, response, self.config.ttl())
            .with_debug_key(preview);

        if let Err(e) = store.put(entry).await {
            warn!(%fingerprint, error = %e, "failed to cache response");
            return;
        }

        debug!(%fingerprint, "cached response");

        let Some(index) = &self.similarity else {
            return;
        };

        if text.is_empty() {
            return;
        }

        match index.size().await {
            Ok(size) if size >= self.config.max_index_size => {
                warn!(
                    size,
                    max = self.config.max_index_size,
                    "similarity index at capacity, skipping insert"
                );
            }
            Ok(_) => {
                if let Err(e) = index.add(&fingerprint, &text).await {
                    warn!(%fingerprint, error = %e, "failed to index response text");
                }
            }
            Err(e) => {
                warn!(error = %e, "similarity index size unavailable, skipping insert");
            }
        }
    }

    /// Removes every cached entry from both tiers.
    pub async fn clear(&self) {
        if let Some(store) = &self.store {
            match store.clear().await {
                Ok(removed) => debug!(removed, "cleared exact store"),
                Err(e) => warn!(error = %e, "failed to clear exact store"),
            }
        }

        if let Some(index) = &self.similarity {
            if let Err(e) = index.clear().await {
                warn!(error = %e, "failed to clear similarity index");
            }
        }
    }

    /// Point-in-time hit/miss counters.
    pub fn statistics(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// Number of keys in the similarity index, if that tier is enabled.
    pub async fn similarity_size(&self) -> Option<usize> {
        match &self.similarity {
            Some(index) => index.size().await.ok(),
            None => None,
        }
    }

    /// Aggregate facts about the backing store, if the cache is enabled.
    pub async fn store_stats(&self) -> Option<StoreStats> {
        match &self.store {
            Some(store) => match store.stats().await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(error = %e, "store stats unavailable");
                    None
                }
            },
            None => None,
        }
    }
}
