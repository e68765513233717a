//! LLM provider configuration.

use std::time::Duration;

use crate::error::{LlmError, LlmResult};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_ANALYSIS_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_IDEAS_MODEL: &str = "openai/gpt-oss-120b";

/// Configuration for the OpenAI-compatible chat completions provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    /// Base URL up to and excluding `/chat/completions`
    pub base_url: String,
    /// Model for trend analysis
    pub analysis_model: String,
    /// Model for idea lists and idea details
    pub ideas_model: String,
    pub temperature: f64,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            ideas_model: DEFAULT_IDEAS_MODEL.to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables. `GROQ_API_KEY` is required.
    pub fn from_env() -> LlmResult<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::config("GROQ_API_KEY must be set"))?;

        let defaults = Self::default();
        Ok(Self {
            api_key,
            base_url: std::env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
            analysis_model: std::env::var("LLM_ANALYSIS_MODEL").unwrap_or(defaults.analysis_model),
            ideas_model: std::env::var("LLM_IDEAS_MODEL").unwrap_or(defaults.ideas_model),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| (0.0..=2.0).contains(t))
                .unwrap_or(defaults.temperature),
            timeout: std::env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: defaults.connect_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_requires_api_key() {
        std::env::remove_var("GROQ_API_KEY");
        assert!(matches!(LlmConfig::from_env(), Err(LlmError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_defaults_and_bad_temperature() {
        std::env::set_var("GROQ_API_KEY", "gsk_test");
        std::env::set_var("LLM_TEMPERATURE", "9.5");
        std::env::remove_var("LLM_ANALYSIS_MODEL");
        std::env::remove_var("LLM_TIMEOUT_SECS");

        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.analysis_model, DEFAULT_ANALYSIS_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(60));

        std::env::remove_var("LLM_TEMPERATURE");
        std::env::remove_var("GROQ_API_KEY");
    }
}
