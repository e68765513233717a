//! Cache writer configuration.

use std::time::Duration;

use trend_firestore::StoreBackend;
use trend_models::{ContentType, RegionCode};

use crate::error::{WorkerError, WorkerResult};

pub const DEFAULT_REGIONS: [&str; 4] = ["US", "IN", "GB", "JP"];

/// Cache writer configuration.
#[derive(Debug, Clone)]
pub struct CacheWriterConfig {
    /// Regions refreshed on every run
    pub regions: Vec<RegionCode>,
    /// Content types per region; empty means one unscoped document per region
    pub content_types: Vec<ContentType>,
    /// Targets processed at the same time
    pub max_concurrency: usize,
    /// Upper bound on fetch + analyze + store for one target
    pub target_timeout: Duration,
    /// Loop period; `None` runs once and exits
    pub interval: Option<Duration>,
    pub store_backend: StoreBackend,
    /// Prometheus scrape port while looping
    pub metrics_port: Option<u16>,
}

impl Default for CacheWriterConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS
                .iter()
                .filter_map(|r| RegionCode::parse(r).ok())
                .collect(),
            content_types: Vec::new(),
            max_concurrency: 1,
            target_timeout: Duration::from_secs(300),
            interval: None,
            store_backend: StoreBackend::default(),
            metrics_port: None,
        }
    }
}

impl CacheWriterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let defaults = Self::default();

        let regions = match std::env::var("TREND_REGIONS") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw, RegionCode::parse)?,
            _ => defaults.regions,
        };
        if regions.is_empty() {
            return Err(WorkerError::config_error("TREND_REGIONS must name at least one region"));
        }

        let content_types = match std::env::var("TREND_CONTENT_TYPES") {
            Ok(raw) => parse_list(&raw, str::parse::<ContentType>)?,
            Err(_) => defaults.content_types,
        };

        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            regions,
            content_types,
            max_concurrency: std::env::var("CACHE_MAX_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrency),
            target_timeout: std::env::var("CACHE_TARGET_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.target_timeout),
            interval: std::env::var("CACHE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .map(Duration::from_secs),
            store_backend: StoreBackend::from_env()?,
            metrics_port: std::env::var("WORKER_METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|_| metrics_enabled),
        })
    }
}

/// Parse a comma-separated list, ignoring blank entries and duplicates.
fn parse_list<T, E, F>(raw: &str, parse: F) -> WorkerResult<Vec<T>>
where
    T: PartialEq,
    E: Into<WorkerError>,
    F: Fn(&str) -> Result<T, E>,
{
    let mut out = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value = parse(item).map_err(Into::into)?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in [
            "TREND_REGIONS",
            "TREND_CONTENT_TYPES",
            "CACHE_MAX_CONCURRENCY",
            "CACHE_TARGET_TIMEOUT_SECS",
            "CACHE_INTERVAL_SECS",
            "STORE_BACKEND",
            "WORKER_METRICS_PORT",
            "METRICS_ENABLED",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = CacheWriterConfig::from_env().unwrap();
        let regions: Vec<&str> = config.regions.iter().map(|r| r.as_str()).collect();
        assert_eq!(regions, vec!["US", "IN", "GB", "JP"]);
        assert!(config.content_types.is_empty());
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.target_timeout, Duration::from_secs(300));
        assert!(config.interval.is_none());
        assert_eq!(config.store_backend, StoreBackend::Firestore);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("TREND_REGIONS", "us, de,US");
        std::env::set_var("TREND_CONTENT_TYPES", "music,games");
        std::env::set_var("CACHE_MAX_CONCURRENCY", "3");
        std::env::set_var("CACHE_INTERVAL_SECS", "3600");
        std::env::set_var("STORE_BACKEND", "memory");

        let config = CacheWriterConfig::from_env().unwrap();
        assert_eq!(config.regions.len(), 2);
        assert_eq!(config.regions[1].as_str(), "DE");
        assert_eq!(config.content_types, vec![ContentType::Music, ContentType::Games]);
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_bad_region() {
        clear_env();
        std::env::set_var("TREND_REGIONS", "US,USA");
        assert!(matches!(
            CacheWriterConfig::from_env(),
            Err(WorkerError::Model(_))
        ));
        clear_env();
    }
}
