//! Exact-store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::CacheError;
use crate::domain::cache::CacheEntry;

/// Aggregate facts about the backing store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of live records
    pub entries: usize,
    /// Total bytes on disk across records
    pub total_bytes: u64,
    /// Unix timestamp of the oldest record, if any
    pub oldest: Option<u64>,
    /// Unix timestamp of the newest record, if any
    pub newest: Option<u64>,
}

/// Durable fingerprint-to-response map with TTL expiry.
///
/// Implementations must treat expired and unreadable records as absent on
/// `get`; corruption is repaired by deleting the record, never surfaced to
/// the caller as an error.
#[async_trait]
pub trait ResponseStore: Send + Sync + Debug {
    /// Loads the live entry for a fingerprint, or `None` on miss, expiry, or
    /// corruption.
    async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Writes an entry, replacing any previous record for the same
    /// fingerprint (last write wins).
    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Removes a single record, returning whether it existed.
    async fn delete(&self, fingerprint: &str) -> Result<bool, CacheError>;

    /// Removes every record, returning how many were deleted.
    async fn clear(&self) -> Result<usize, CacheError>;

    /// Reports entry count, total bytes, and oldest/newest timestamps.
    async fn stats(&self) -> Result<StoreStats, CacheError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock store for orchestrator tests
    #[derive(Debug, Default)]
    pub struct MockResponseStore {
        entries: Mutex<HashMap<String, CacheEntry>>,
        error: Mutex<Option<String>>,
    }

    impl MockResponseStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        fn check_error(&self) -> Result<(), CacheError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(CacheError::storage(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ResponseStore for MockResponseStore {
        async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
            self.check_error()?;
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .get(fingerprint)
                .filter(|entry| !entry.is_expired())
                .cloned())
        }

        async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
            self.check_error()?;
            self.entries
                .lock()
                .unwrap()
                .insert(entry.fingerprint().to_string(), entry);
            Ok(())
        }

        async fn delete(&self, fingerprint: &str) -> Result<bool, CacheError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().remove(fingerprint).is_some())
        }

        async fn clear(&self) -> Result<usize, CacheError> {
            self.check_error()?;
            let mut entries = self.entries.lock().unwrap();
            let count = entries.len();
            entries.clear();
            Ok(count)
        }

        async fn stats(&self) -> Result<StoreStats, CacheError> {
            self.check_error()?;
            let entries = self.entries.lock().unwrap();
            Ok(StoreStats {
                entries: entries.len(),
                total_bytes: entries.values().map(|e| e.response().len() as u64).sum(),
                oldest: entries.values().map(CacheEntry::created_at).min(),
                newest: entries.values().map(CacheEntry::created_at).max(),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::Duration;

        #[test]
        fn test_mock_round_trip() {
            tokio_test::block_on(async {
                let store = MockResponseStore::new();
                store
                    .put(CacheEntry::new("fp", "value", Duration::from_secs(60)))
                    .await
                    .unwrap();

                let entry = store.get("fp").await.unwrap().unwrap();
                assert_eq!(entry.response(), "value");

                assert!(store.delete("fp").await.unwrap());
                assert!(store.get("fp").await.unwrap().is_none());
            });
        }

        #[tokio::test]
        async fn test_mock_expired_entry_not_returned() {
            let store = MockResponseStore::new();
            store
                .put(CacheEntry::new("fp", "value", Duration::from_secs(0)))
                .await
                .unwrap();

            assert!(store.get("fp").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_mock_error_injection() {
            let store = MockResponseStore::new().with_error("disk on fire");
            assert!(store.get("fp").await.is_err());
        }

        #[tokio::test]
        async fn test_mock_stats() {
            let store = MockResponseStore::new();
            store
                .put(CacheEntry::new("a", "12345", Duration::from_secs(60)))
                .await
                .unwrap();
            store
                .put(CacheEntry::new("b", "123", Duration::from_secs(60)))
                .await
                .unwrap();

            let stats = store.stats().await.unwrap();
            assert_eq!(stats.entries, 2);
            assert_eq!(stats.total_bytes, 8);
            assert!(stats.oldest.is_some());
        }
    }
}
