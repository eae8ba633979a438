//! Disk-persisted exact store
//!
//! One JSON file per fingerprint under the cache directory. Writes go to a
//! uniquely named temp file in the same directory and are renamed into place,
//! so concurrent writers (including other processes sharing the directory)
//! resolve last-write-wins without locking. Expiry is lazy: a record is
//! deleted the first time a read observes it past its TTL.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::CacheError;
use crate::domain::cache::{CacheEntry, ResponseStore, StoreStats};

/// Monotonic suffix so concurrent writers of the same key never share a temp
/// file.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk record layout, one file per entry
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    response: String,
    timestamp: u64,
    ttl: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

/// `ResponseStore` backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct DiskResponseStore {
    dir: PathBuf,
}

impl DiskResponseStore {
    /// Fails if the directory cannot be created (permissions, read-only
    /// filesystem); the orchestrator downgrades the whole cache to disabled
    /// in that case.
    pub fn try_new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();

        std::fs::create_dir_all(&dir).map_err(|e| {
            CacheError::configuration(format!(
                "cache directory {} cannot be created: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    fn tmp_path(&self, fingerprint: &str) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{fingerprint}.{}.{seq}.tmp", std::process::id()))
    }

    async fn remove_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove cache file");
            }
        }
    }

    fn unix_secs(time: SystemTime) -> u64 {
        time.duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[async_trait]
impl ResponseStore for DiskResponseStore {
    async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(fingerprint);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(fingerprint, error = %e, "unreadable cache record, treating as miss");
                return Ok(None);
            }
        };

        let record: StoredRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                let err = CacheError::corrupt_entry(format!("{fingerprint}: {e}"));
                warn!(error = %err, "deleting corrupt cache record");
                Self::remove_quietly(&path).await;
                return Ok(None);
            }
        };

        let entry = CacheEntry::restore(
            fingerprint,
            record.response,
            record.timestamp,
            record.ttl,
            record.key,
        );

        if entry.is_expired() {
            debug!(fingerprint, "cache record expired, deleting");
            Self::remove_quietly(&path).await;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let record = StoredRecord {
            response: entry.response().to_string(),
            timestamp: entry.created_at(),
            ttl: entry.ttl_secs(),
            key: entry.debug_key().map(str::to_string),
        };

        let payload = serde_json::to_string(&record)
            .map_err(|e| CacheError::serialization(format!("cache record: {e}")))?;

        let path = self.entry_path(entry.fingerprint());
        let tmp = self.tmp_path(entry.fingerprint());

        fs::write(&tmp, payload.as_bytes())
            .await
            .map_err(|e| CacheError::storage(format!("write {}: {e}", tmp.display())))?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            Self::remove_quietly(&tmp).await;
            return Err(CacheError::storage(format!(
                "rename into {}: {e}",
                path.display()
            )));
        }

        Ok(())
    }

    async fn delete(&self, fingerprint: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.entry_path(fingerprint)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::storage(format!("delete {fingerprint}: {e}"))),
        }
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let mut dir = fs::read_dir(&self.dir)
            .await
            .map_err(|e| CacheError::storage(format!("read {}: {e}", self.dir.display())))?;

        let mut removed = 0;

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::storage(format!("read {}: {e}", self.dir.display())))?
        {
            let path = item.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                Self::remove_quietly(&path).await;
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn stats(&self) -> Result<StoreStats, CacheError> {
        let mut dir = fs::read_dir(&self.dir)
            .await
            .map_err(|e| CacheError::storage(format!("read {}: {e}", self.dir.display())))?;

        let mut stats = StoreStats::default();

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::storage(format!("read {}: {e}", self.dir.display())))?
        {
            let path = item.path();

            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let Ok(meta) = item.metadata().await else {
                continue;
            };

            stats.entries += 1;
            stats.total_bytes += meta.len();

            if let Ok(modified) = meta.modified() {
                let secs = Self::unix_secs(modified);
                stats.oldest = Some(stats.oldest.map_or(secs, |o| o.min(secs)));
                stats.newest = Some(stats.newest.map_or(secs, |n| n.max(secs)));
            }
        }

        Ok(stats)
    }
}
