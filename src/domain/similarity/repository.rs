//! Similarity index trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::CacheError;

/// Approximate text-matching index over previously cached requests.
///
/// Purely in-memory: starts cold on every process restart while the exact
/// store stays warm, an intentional asymmetry. Matching is probabilistic;
/// both false positives and false negatives are expected.
#[async_trait]
pub trait SimilarityIndex: Send + Sync + Debug {
    /// Sketches `text` and indexes it under `key` (an exact-store
    /// fingerprint). Re-adding a key replaces its sketch.
    async fn add(&self, key: &str, text: &str) -> Result<(), CacheError>;

    /// Returns the key of some indexed text similar to `text`, or `None`.
    ///
    /// No ranking guarantee beyond "first found"; ties are broken
    /// arbitrarily.
    async fn find_similar(&self, text: &str) -> Result<Option<String>, CacheError>;

    /// Removes a key from the side table, returning whether it was present.
    ///
    /// Bucket references may remain stale afterwards; `find_similar` skips
    /// them. The supported remediation for heavy churn is a full rebuild
    /// (`clear` and re-`add`), not incremental deletion.
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;

    /// Number of indexed keys.
    async fn size(&self) -> Result<usize, CacheError>;

    /// Drops every sketch and bucket.
    async fn clear(&self) -> Result<(), CacheError>;
}
