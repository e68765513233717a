//! Trending video client.

use std::time::Instant;

use metrics::{counter, histogram};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use trend_models::{ContentType, RegionCode, VideoRecord};

use crate::config::{TrendingConfig, DEFAULT_MAX_VIDEOS};
use crate::error::{TrendingError, TrendingResult};

/// Raw `/trending` reply. Only `data` is read.
#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for the RapidAPI `yt-api` trending endpoint.
#[derive(Clone)]
pub struct TrendingClient {
    http: Client,
    config: TrendingConfig,
}

impl TrendingClient {
    pub fn new(config: TrendingConfig) -> TrendingResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("trend-youtube/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> TrendingResult<Self> {
        Self::new(TrendingConfig::from_env()?)
    }

    pub fn config(&self) -> &TrendingConfig {
        &self.config
    }

    /// Fetch trending videos for a region.
    ///
    /// Never fails: transport errors, non-success statuses and undecodable
    /// bodies are logged and yield an empty list.
    pub async fn fetch_trending(
        &self,
        region: &RegionCode,
        content_type: Option<ContentType>,
    ) -> Vec<VideoRecord> {
        let start = Instant::now();
        let result = self.try_fetch_trending(region, content_type).await;
        histogram!("trend_fetch_duration_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(videos) => {
                counter!("trend_fetch_total", "outcome" => "ok").increment(1);
                info!(
                    region = %region,
                    content_type = content_type.map(|c| c.as_str()).unwrap_or("all"),
                    videos = videos.len(),
                    "Fetched trending videos"
                );
                videos
            }
            Err(e) => {
                counter!("trend_fetch_total", "outcome" => e.kind()).increment(1);
                warn!(
                    region = %region,
                    content_type = content_type.map(|c| c.as_str()).unwrap_or("all"),
                    error = %e,
                    "Trending fetch failed, returning no videos"
                );
                Vec::new()
            }
        }
    }

    /// Fetch trending videos, surfacing the failure reason.
    pub async fn try_fetch_trending(
        &self,
        region: &RegionCode,
        content_type: Option<ContentType>,
    ) -> TrendingResult<Vec<VideoRecord>> {
        let url = format!("{}/trending", self.config.base_url.trim_end_matches('/'));
        let mut query = vec![("geo", region.as_str())];
        if let Some(ct) = content_type {
            query.push(("type", ct.as_str()));
        }

        debug!(url = %url, region = %region, "Requesting trending videos");
        let response = self
            .http
            .get(&url)
            .query(&query)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendingError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: TrendingResponse =
            serde_json::from_str(&body).map_err(|e| TrendingError::Decode(e.to_string()))?;

        Ok(parsed
            .data
            .iter()
            .take(self.config.max_videos.min(DEFAULT_MAX_VIDEOS))
            .map(normalize_video)
            .collect())
    }
}

/// Map one raw entry to a [`VideoRecord`], tolerating missing or odd fields.
pub fn normalize_video(entry: &Value) -> VideoRecord {
    VideoRecord {
        video_id: string_field(entry, "videoId"),
        title: string_field(entry, "title"),
        description: string_field(entry, "description"),
        thumbnail_url: entry
            .get("thumbnail")
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        channel_title: string_field(entry, "channelTitle"),
        view_count: string_field(entry, "viewCount"),
        published_text: string_field(entry, "publishedTimeText")
            .or_else(|| string_field(entry, "publishedText")),
    }
}

/// String value of `key`; numbers are rendered as their decimal text.
fn string_field(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
