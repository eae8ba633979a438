use thiserror::Error;

/// Errors raised inside the cache subsystem.
///
/// None of these ever cross the public lookup boundary: the orchestrating
/// service absorbs them and degrades to a miss (reads) or a skipped write.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Corrupt cache entry: {message}")]
    CorruptEntry { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Similarity backend unavailable: {message}")]
    SimilarityUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CacheError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn corrupt_entry(message: impl Into<String>) -> Self {
        Self::CorruptEntry {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn similarity_unavailable(message: impl Into<String>) -> Self {
        Self::SimilarityUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
