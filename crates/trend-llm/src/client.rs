//! OpenAI-compatible chat completions client (Groq).
//!
//! One request per call: no retry, no model fallback.

use std::time::Instant;

use metrics::{counter, histogram};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::config::LlmConfig;
use crate::error::{LlmError, LlmResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("trend-llm/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> LlmResult<Self> {
        Self::new(LlmConfig::from_env()?)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Request a JSON-object completion and return the raw reply text.
    ///
    /// `operation` labels logs and metrics (e.g. `trend-analysis`).
    pub async fn complete_json(
        &self,
        operation: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> LlmResult<String> {
        let span = info_span!("llm_request", operation = %operation, model = %model);
        let start = Instant::now();

        let result = self.send(model, messages).instrument(span).await;

        histogram!("trend_llm_latency_seconds", "operation" => operation.to_string())
            .record(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        counter!(
            "trend_llm_requests_total",
            "operation" => operation.to_string(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    async fn send(&self, model: &str, messages: &[ChatMessage]) -> LlmResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let reply: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("provider envelope: {}", e)))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyReply)?;

        debug!(chars = content.len(), "LLM reply received");
        Ok(content)
    }
}
