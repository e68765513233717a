//! Trending YouTube video fetcher.
//!
//! Wraps the RapidAPI `yt-api` `/trending` endpoint and normalizes its
//! entries into [`trend_models::VideoRecord`]s.

pub mod client;
pub mod config;
pub mod error;

pub use client::{normalize_video, TrendingClient};
pub use config::TrendingConfig;
pub use error::{TrendingError, TrendingResult};
