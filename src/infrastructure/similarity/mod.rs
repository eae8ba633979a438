//! Similarity index implementations (MinHash + LSH)

mod in_memory;
mod lsh;
mod minhash;

pub use in_memory::MinHashLshIndex;
