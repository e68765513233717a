//! Trending cache writer.
//!
//! This crate provides:
//! - Target expansion from configured regions and content types
//! - A fetch, analyze, store pass per target with bounded fan-out
//! - Per-target timeout and panic isolation
//! - A run report the binary uses for its exit status

pub mod cache_writer;
pub mod config;
pub mod error;
pub mod logging;

pub use cache_writer::{CacheRunReport, CacheWriter, Target, TargetOutcome, TargetReport};
pub use config::CacheWriterConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
