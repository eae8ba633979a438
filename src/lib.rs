//! Two-tier response cache for generative content backends
//!
//! Layers an exact-match, TTL-bound, disk-persisted response store with an
//! in-memory MinHash/LSH similarity index, so near-duplicate prompts can
//! reuse earlier generative-API responses without a new call:
//!
//! - Exact tier: one JSON file per request fingerprint, atomic replacement,
//!   lazy read-time expiry; survives restarts.
//! - Similarity tier: probabilistic near-duplicate matching over sketches;
//!   in-memory only, so it starts cold on every restart.
//!
//! The cache sits strictly in front of the generative client and never calls
//! it: a miss tells the caller to do the expensive call and `put` the result
//! back. Cache failures are absorbed internally, so caching is purely a
//! performance optimization, never a correctness dependency.
//!
//! ```no_run
//! use contentgen_cache::{CacheConfig, CacheLookup, GenerationRequest, ResponseCacheService};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = CacheConfig::default().with_cache_dir("/var/cache/contentgen");
//! let cache = ResponseCacheService::new(config);
//!
//! let request = GenerationRequest::builder()
//!     .system("You are a marketing expert.")
//!     .user("What is content marketing?")
//!     .temperature(0.7)
//!     .build();
//!
//! match cache.get(&request).await {
//!     CacheLookup::Hit(hit) => println!("{} ({})", hit.response, hit.source),
//!     CacheLookup::Miss => {
//!         let response = "...expensive generative call happens here...";
//!         cache.put(&request, response).await;
//!     }
//! }
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AppConfig, CacheConfig, LoggingConfig};
pub use domain::cache::{
    CacheHit, CacheLookup, CacheSource, CacheStatsSnapshot, FingerprintDeriver, StoreStats,
};
pub use domain::error::CacheError;
pub use domain::request::{GenerationRequest, Message, MessageRole};
pub use infrastructure::services::ResponseCacheService;
