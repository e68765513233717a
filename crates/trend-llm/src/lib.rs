//! LLM-backed trend analysis and content idea generation.
//!
//! This crate provides:
//! - An OpenAI-compatible chat completions client (Groq by default)
//! - Versioned prompt templates with embedded JSON schemas
//! - Reply parsing that tolerates code fences and validates the result
//! - [`TrendAnalyzer`]: videos to an analysis or the sentinel error document
//! - [`IdeaGenerator`]: idea lists and detailed idea plans

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod ideas;
pub mod prompts;
pub mod reply;

pub use analysis::TrendAnalyzer;
pub use client::{ChatMessage, LlmClient};
pub use config::LlmConfig;
pub use error::{LlmError, LlmResult};
pub use ideas::IdeaGenerator;
pub use prompts::PromptTemplate;
