//! In-memory MinHash/LSH similarity index

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use super::lsh::{BandPlan, LshBuckets};
use super::minhash::MinHasher;
use crate::domain::CacheError;
use crate::domain::similarity::SimilarityIndex;

/// `SimilarityIndex` backed by MinHash sketches and LSH banding.
///
/// A side table maps each indexed key to its sketch; the LSH buckets hold
/// key references per band. `remove` only touches the side table, so bucket
/// entries can go stale; `find_similar` treats the side table as the source
/// of truth and skips anything no longer present.
#[derive(Debug)]
pub struct MinHashLshIndex {
    hasher: MinHasher,
    threshold: f64,
    /// Minimum sketch estimate for a bucket candidate to be accepted: the
    /// threshold minus four standard errors of the MinHash estimator. The
    /// banding is tuned for recall, so buckets also surface pairs somewhat
    /// below the threshold; anything under this floor is overwhelmingly a
    /// banding false positive rather than estimator noise.
    acceptance_floor: f64,
    inner: RwLock<IndexState>,
}

#[derive(Debug)]
struct IndexState {
    buckets: LshBuckets,
    sketches: HashMap<String, Vec<u64>>,
}

impl MinHashLshIndex {
    /// Validates the sketching parameters up front; a failure here means the
    /// similarity tier is unavailable and the caller should fall back to
    /// exact-only mode.
    pub fn try_new(threshold: f32, num_perm: usize) -> Result<Self, CacheError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CacheError::similarity_unavailable(format!(
                "similarity threshold must be in (0, 1], got {threshold}"
            )));
        }

        if num_perm < 16 {
            return Err(CacheError::similarity_unavailable(format!(
                "num_perm must be at least 16, got {num_perm}"
            )));
        }

        let threshold = f64::from(threshold);
        let plan = BandPlan::for_threshold(num_perm, threshold);
        let hasher = MinHasher::new(num_perm);

        let standard_error = (threshold * (1.0 - threshold) / num_perm as f64).sqrt();
        let acceptance_floor = (threshold - 4.0 * standard_error).max(0.0);

        debug!(
            num_perm = hasher.num_perm(),
            threshold,
            acceptance_floor,
            bands = plan.bands,
            rows = plan.rows,
            "similarity index ready"
        );

        Ok(Self {
            hasher,
            threshold,
            acceptance_floor,
            inner: RwLock::new(IndexState {
                buckets: LshBuckets::new(plan),
                sketches: HashMap::new(),
            }),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn lock_err(operation: &str) -> CacheError {
        CacheError::internal(format!("similarity index lock poisoned during {operation}"))
    }
}

#[async_trait]
impl SimilarityIndex for MinHashLshIndex {
    async fn add(&self, key: &str, text: &str) -> Result<(), CacheError> {
        let sketch = self.hasher.sketch(text);
        let mut inner = self.inner.write().map_err(|_| Self::lock_err("add"))?;

        inner.buckets.insert(key, &sketch);
        inner.sketches.insert(key.to_string(), sketch);

        Ok(())
    }

    async fn find_similar(&self, text: &str) -> Result<Option<String>, CacheError> {
        let sketch = self.hasher.sketch(text);
        let inner = self.inner.read().map_err(|_| Self::lock_err("query"))?;

        for candidate in inner.buckets.candidates(&sketch) {
            // Stale bucket references (removed keys) are skipped here.
            let Some(candidate_sketch) = inner.sketches.get(candidate) else {
                continue;
            };

            let estimate = MinHasher::similarity(&sketch, candidate_sketch);

            if estimate < self.acceptance_floor {
                debug!(candidate, estimate, "rejecting weak similarity candidate");
                continue;
            }

            debug!(candidate, estimate, "similarity candidate accepted");
            return Ok(Some(candidate.to_string()));
        }

        Ok(None)
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_err("remove"))?;
        Ok(inner.sketches.remove(key).is_some())
    }

    async fn size(&self) -> Result<usize, CacheError> {
        let inner = self.inner.read().map_err(|_| Self::lock_err("size"))?;
        Ok(inner.sketches.len())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_err("clear"))?;
        inner.buckets.clear();
        inner.sketches.clear();
        Ok(())
    }
}
