//! Recommender configuration
//!
//! Loaded from an optional JSON file; every field has a default so a partial
//! file (or none at all) is fine.
//!
//! ```json
//! {
//!   "default_results": 5,
//!   "formatter": { "include_elevation_profile": true, "include_coordinates": true },
//!   "cache": { "max_capacity": 10000, "ttl_secs": 300 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// `k` used when a request does not specify one
    pub default_results: usize,
    pub formatter: FormatterConfig,
    pub cache: CacheConfig,
}

/// Which optional sections the formatter emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub include_elevation_profile: bool,
    pub include_coordinates: bool,
}

/// Memoization limits for the API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_results: 5,
            formatter: FormatterConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_elevation_profile: true,
            include_coordinates: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_secs: 300,
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: RecommenderConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse recommender config JSON")?;

        if config.default_results < 1 {
            anyhow::bail!("default_results must be >= 1, got {}", config.default_results);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RecommenderConfig =
            serde_json::from_str(r#"{"formatter": {"include_coordinates": false}}"#).unwrap();

        assert_eq!(config.default_results, 5);
        assert!(config.formatter.include_elevation_profile);
        assert!(!config.formatter.include_coordinates);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_load_rejects_zero_results() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_results": 0}}"#).unwrap();

        assert!(RecommenderConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_results": 10, "cache": {{"max_capacity": 50}}}}"#).unwrap();

        let config = RecommenderConfig::load(file.path()).unwrap();
        assert_eq!(config.default_results, 10);
        assert_eq!(config.cache.max_capacity, 50);
        assert_eq!(config.cache.ttl_secs, 300);
    }
}
