//! Content idea generation for creators.

use metrics::counter;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use trend_models::{AnalysisDocument, CreatorProfile, Idea, IdeaDetailsRequest, IdeaList, IdeaPlan};
use validator::Validate;

use crate::client::{ChatMessage, LlmClient};
use crate::error::{LlmError, LlmResult};
use crate::prompts::{
    render, schema_json, PromptTemplate, CONTENT_IDEAS, IDEA_DETAILS, TREND_CONTEXT,
};
use crate::reply::parse_validated;

/// Generates idea lists and detailed plans. One LLM call per request.
#[derive(Clone)]
pub struct IdeaGenerator {
    client: LlmClient,
    model: String,
    ideas_schema: String,
    plan_schema: String,
}

impl IdeaGenerator {
    pub fn new(client: LlmClient) -> Self {
        let model = client.config().ideas_model.clone();
        Self {
            client,
            model,
            ideas_schema: schema_json::<IdeaList>(),
            plan_schema: schema_json::<IdeaPlan>(),
        }
    }

    /// Five ideas for `profile`, steered by `analysis` when given.
    ///
    /// `None` if the provider fails or the reply is not exactly five valid ideas.
    pub async fn list_ideas(
        &self,
        profile: &CreatorProfile,
        analysis: Option<&AnalysisDocument>,
    ) -> Option<Vec<Idea>> {
        let trend_context = match analysis {
            Some(doc) => {
                let pretty = serde_json::to_string_pretty(doc).unwrap_or_default();
                render(TREND_CONTEXT, &[("analysis", &pretty)])
            }
            None => String::new(),
        };

        let messages = CONTENT_IDEAS.messages(&[
            ("schema", &self.ideas_schema),
            ("trend_context", &trend_context),
            ("primary_category", &profile.primary_category),
            ("ideal_creator", &profile.ideal_creator),
            ("budget", &profile.budget),
            ("resources", &profile.resources),
            ("video_style", &profile.video_style),
        ]);

        let list: IdeaList = self
            .run(&CONTENT_IDEAS, &messages, analysis.is_some())
            .await?;
        Some(list.ideas)
    }

    /// Detailed plan for one idea; `None` on any failure.
    pub async fn expand_idea(&self, request: &IdeaDetailsRequest) -> Option<IdeaPlan> {
        let profile = &request.profile;
        let messages = IDEA_DETAILS.messages(&[
            ("schema", &self.plan_schema),
            ("topic", &request.topic),
            ("description", &request.description),
            ("primary_category", &profile.primary_category),
            ("ideal_creator", &profile.ideal_creator),
            ("budget", &profile.budget),
            ("resources", &profile.resources),
            ("video_style", &profile.video_style),
        ]);

        self.run(&IDEA_DETAILS, &messages, false).await
    }

    async fn run<T>(
        &self,
        template: &PromptTemplate,
        messages: &[ChatMessage],
        trend_steered: bool,
    ) -> Option<T>
    where
        T: DeserializeOwned + Validate,
    {
        match self.call(template, messages).await {
            Ok(value) => {
                info!(template = %template.id(), trend_steered, "Idea generation complete");
                Some(value)
            }
            Err(e) => {
                counter!("trend_llm_invalid_replies_total", "operation" => template.name, "reason" => e.kind())
                    .increment(1);
                warn!(template = %template.id(), trend_steered, error = %e, "Idea generation failed");
                None
            }
        }
    }

    async fn call<T>(
        &self,
        template: &PromptTemplate,
        messages: &[ChatMessage],
    ) -> LlmResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        let raw = self
            .client
            .complete_json(template.name, &self.model, messages)
            .await?;
        parse_validated(&raw).map_err(|e| match e {
            LlmError::Validation(msg) => LlmError::Validation(format!("{}: {}", template.name, msg)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::LlmConfig;

    fn generator(server: &MockServer) -> IdeaGenerator {
        IdeaGenerator::new(
            LlmClient::new(LlmConfig {
                api_key: "gsk_test".to_string(),
                base_url: server.uri(),
                timeout: Duration::from_secs(2),
                ..LlmConfig::default()
            })
            .unwrap(),
        )
    }

    fn profile() -> CreatorProfile {
        CreatorProfile {
            primary_category: "Gaming".to_string(),
            ideal_creator: "MrBeast".to_string(),
            budget: "low".to_string(),
            resources: "phone".to_string(),
            video_style: "vlog".to_string(),
        }
    }

    fn completion(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": content.to_string()}}]
        }))
    }

    fn ideas(n: usize) -> serde_json::Value {
        json!({
            "ideas": (0..n).map(|i| json!({"title": format!("Idea {i}"), "description": "Short pitch."}))
                .collect::<Vec<_>>()
        })
    }

    #[tokio::test]
    async fn test_list_ideas_returns_five() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("openai/gpt-oss-120b"))
            .and(body_string_contains("MrBeast"))
            .respond_with(completion(ideas(5)))
            .expect(1)
            .mount(&server)
            .await;

        let ideas = generator(&server).list_ideas(&profile(), None).await.unwrap();
        assert_eq!(ideas.len(), 5);
        assert_eq!(ideas[0].short_description, "Short pitch.");
    }

    #[tokio::test]
    async fn test_list_ideas_embeds_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("CRITICAL CONTEXT"))
            .and(body_string_contains("Retro speedruns"))
            .respond_with(completion(ideas(5)))
            .expect(1)
            .mount(&server)
            .await;

        let analysis = AnalysisDocument {
            dominant_theme: "Retro speedruns".to_string(),
            emerging_trend: "Handheld mods".to_string(),
            video_breakdowns: vec![],
        };
        let ideas = generator(&server)
            .list_ideas(&profile(), Some(&analysis))
            .await;
        assert!(ideas.is_some());
    }

    #[tokio::test]
    async fn test_list_ideas_wrong_count_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(ideas(3)))
            .mount(&server)
            .await;

        assert!(generator(&server).list_ideas(&profile(), None).await.is_none());
    }

    #[tokio::test]
    async fn test_expand_idea() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Budget challenge"))
            .respond_with(completion(json!({
                "video_title": "I Lived on $10",
                "video_description": "A day on ten dollars.",
                "hook": "Can it be done?",
                "intro": "Rules first.",
                "main_content": ["Breakfast", "Lunch", "Dinner", "Verdict"],
                "outro": "That was hard.",
                "call_to_action": "Subscribe for part two",
                "thumbnail_text": "$10 DAY",
                "hashtags": "#budget #challenge"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = IdeaDetailsRequest {
            topic: "Budget challenge".to_string(),
            description: "Spend $10 for a day".to_string(),
            profile: profile(),
        };
        let plan = generator(&server).expand_idea(&request).await.unwrap();
        assert_eq!(plan.main_content.len(), 4);
    }

    #[tokio::test]
    async fn test_expand_idea_garbage_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(json!({"video_title": "only a title"})))
            .mount(&server)
            .await;

        let request = IdeaDetailsRequest {
            topic: "t".to_string(),
            description: "d".to_string(),
            profile: profile(),
        };
        assert!(generator(&server).expand_idea(&request).await.is_none());
    }
}
