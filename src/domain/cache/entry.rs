//! Cache entry and lookup result types

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A durable exact-store entry.
///
/// Identity is the fingerprint. Expiry is enforced lazily: the entry stays on
/// disk until the first read that observes it past its TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    fingerprint: String,
    response: String,
    created_at: u64,
    ttl_secs: u64,
    debug_key: Option<String>,
}

impl CacheEntry {
    /// Creates a fresh entry stamped with the current time.
    pub fn new(fingerprint: impl Into<String>, response: impl Into<String>, ttl: Duration) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            response: response.into(),
            created_at: unix_now(),
            ttl_secs: ttl.as_secs(),
            debug_key: None,
        }
    }

    /// Rebuilds an entry from its persisted fields.
    pub fn restore(
        fingerprint: impl Into<String>,
        response: impl Into<String>,
        created_at: u64,
        ttl_secs: u64,
        debug_key: Option<String>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            response: response.into(),
            created_at,
            ttl_secs,
            debug_key,
        }
    }

    /// Attaches a human-readable request preview, persisted for debugging only.
    pub fn with_debug_key(mut self, debug_key: impl Into<String>) -> Self {
        self.debug_key = Some(debug_key.into());
        self
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn into_response(self) -> String {
        self.response
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn debug_key(&self) -> Option<&str> {
        self.debug_key.as_deref()
    }

    /// An entry written at `t0` with TTL `T` is live for `t in [t0, t0 + T)`.
    pub fn is_expired(&self) -> bool {
        unix_now().saturating_sub(self.created_at) >= self.ttl_secs
    }
}

/// Which tier produced a cache hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Exact,
    Similarity,
}

impl fmt::Display for CacheSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSource::Exact => write!(f, "exact"),
            CacheSource::Similarity => write!(f, "similarity"),
        }
    }
}

/// A successful cache lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub response: String,
    pub source: CacheSource,
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(CacheHit),
    Miss,
}

impl CacheLookup {
    pub fn exact(response: impl Into<String>) -> Self {
        Self::Hit(CacheHit {
            response: response.into(),
            source: CacheSource::Exact,
        })
    }

    pub fn similar(response: impl Into<String>) -> Self {
        Self::Hit(CacheHit {
            response: response.into(),
            source: CacheSource::Similarity,
        })
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Hit(hit) => Some(&hit.response),
            Self::Miss => None,
        }
    }

    pub fn source(&self) -> Option<CacheSource> {
        match self {
            Self::Hit(hit) => Some(hit.source),
            Self::Miss => None,
        }
    }
}
