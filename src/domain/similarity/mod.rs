//! Similarity-tier domain contract

mod repository;

pub use repository::SimilarityIndex;

#[cfg(test)]
pub use repository::mock::MockSimilarityIndex;
