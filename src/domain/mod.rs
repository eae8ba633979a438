//! Domain layer - cache types and contracts

pub mod cache;
pub mod error;
pub mod request;
pub mod similarity;

pub use cache::{
    CacheEntry, CacheHit, CacheLookup, CacheSource, CacheStatistics, CacheStatsSnapshot,
    FingerprintDeriver, ResponseStore, StoreStats,
};
pub use error::CacheError;
pub use request::{GenerationRequest, Message, MessageRole};
pub use similarity::SimilarityIndex;
