//! Trending API configuration.

use std::time::Duration;

use crate::error::{TrendingError, TrendingResult};

pub const DEFAULT_BASE_URL: &str = "https://yt-api.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "yt-api.p.rapidapi.com";
/// Upper bound on records per fetch; larger settings are clamped.
pub const DEFAULT_MAX_VIDEOS: usize = 10;

/// Trending API client configuration.
#[derive(Debug, Clone)]
pub struct TrendingConfig {
    /// RapidAPI key (`x-rapidapi-key`)
    pub api_key: String,
    /// RapidAPI host header (`x-rapidapi-host`)
    pub api_host: String,
    pub base_url: String,
    /// Records kept per fetch, at most [`DEFAULT_MAX_VIDEOS`]
    pub max_videos: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_videos: DEFAULT_MAX_VIDEOS,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TrendingConfig {
    /// Create config from environment variables. `RAPID_API_KEY` is required.
    pub fn from_env() -> TrendingResult<Self> {
        let api_key = std::env::var("RAPID_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TrendingError::config("RAPID_API_KEY must be set"))?;

        let defaults = Self::default();
        Ok(Self {
            api_key,
            api_host: std::env::var("RAPID_API_HOST").unwrap_or(defaults.api_host),
            base_url: std::env::var("TRENDING_API_BASE_URL").unwrap_or(defaults.base_url),
            max_videos: std::env::var("TRENDING_MAX_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .map(|n: usize| n.min(DEFAULT_MAX_VIDEOS))
                .unwrap_or(defaults.max_videos),
            timeout: std::env::var("TRENDING_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: defaults.connect_timeout,
        })
    }
}
