//! Application and cache configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration for the cache CLI / embedding application
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `config/default` and `config/local` files (both optional) with
    /// `CONTENTGEN__`-prefixed environment overrides, e.g.
    /// `CONTENTGEN__CACHE__TTL_SECS=600`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("CONTENTGEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Construction-time parameters for the two-tier response cache
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cached response
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Time-to-live for cached responses in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Whether the similarity tier is active
    #[serde(default = "default_true")]
    pub enable_similarity: bool,

    /// Target Jaccard similarity for near-duplicate matching, in (0, 1]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Maximum number of keys the similarity index may hold
    #[serde(default = "default_max_index_size")]
    pub max_index_size: usize,

    /// MinHash permutation count
    #[serde(default = "default_num_perm")]
    pub num_perm: usize,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache/responses")
}

fn default_ttl_secs() -> u64 {
    86_400
}

fn default_true() -> bool {
    true
}

fn default_similarity_threshold() -> f32 {
    0.85
}

fn default_max_index_size() -> usize {
    1_000
}

fn default_num_perm() -> usize {
    128
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
            enable_similarity: default_true(),
            similarity_threshold: default_similarity_threshold(),
            max_index_size: default_max_index_size(),
            num_perm: default_num_perm(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_similarity(mut self, enabled: bool) -> Self {
        self.enable_similarity = enabled;
        self
    }

    /// Clamped to (0, 1]: zero would match everything.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn with_max_index_size(mut self, max: usize) -> Self {
        self.max_index_size = max;
        self
    }

    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();

        assert_eq!(config.cache_dir, PathBuf::from(".cache/responses"));
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert!(config.enable_similarity);
        assert!((config.similarity_threshold - 0.85).abs() < 0.001);
        assert_eq!(config.max_index_size, 1_000);
        assert_eq!(config.num_perm, 128);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .with_cache_dir("/tmp/responses")
            .with_ttl(Duration::from_secs(600))
            .with_similarity(false)
            .with_similarity_threshold(0.9)
            .with_max_index_size(50)
            .with_num_perm(64);

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/responses"));
        assert_eq!(config.ttl_secs, 600);
        assert!(!config.enable_similarity);
        assert!((config.similarity_threshold - 0.9).abs() < 0.001);
        assert_eq!(config.max_index_size, 50);
        assert_eq!(config.num_perm, 64);
    }

    #[test]
    fn test_threshold_clamped() {
        let config = CacheConfig::new().with_similarity_threshold(1.5);
        assert!((config.similarity_threshold - 1.0).abs() < 0.001);

        let config = CacheConfig::new().with_similarity_threshold(-0.5);
        assert!(config.similarity_threshold > 0.0);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"ttl_secs": 60}"#).unwrap();
        assert_eq!(config.ttl_secs, 60);
        assert_eq!(config.num_perm, 128);
        assert!(config.enable_similarity);
    }

    #[test]
    fn test_log_format_deserializes_lowercase() {
        let logging: LoggingConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
    }
}
