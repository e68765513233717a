//! Versioned prompt templates.
//!
//! Placeholders are written `{{name}}` and filled in a single pass, so values
//! that themselves contain braces are inserted verbatim.

use schemars::JsonSchema;

use crate::client::ChatMessage;

/// A named, versioned pair of system/user prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: u32,
    pub system: &'static str,
    pub user: Option<&'static str>,
}

impl PromptTemplate {
    /// `name@vN`, used in logs.
    pub fn id(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }

    /// Render the chat messages for this template.
    pub fn messages(&self, vars: &[(&str, &str)]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(render(self.system, vars))];
        if let Some(user) = self.user {
            messages.push(ChatMessage::user(render(user, vars)));
        }
        messages
    }
}

/// Substitute `{{name}}` placeholders. Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Pretty JSON schema of `T`, for embedding in prompts.
pub fn schema_json<T: JsonSchema>() -> String {
    serde_json::to_string_pretty(&schemars::schema_for!(T)).unwrap_or_default()
}

pub const TREND_ANALYSIS: PromptTemplate = PromptTemplate {
    name: "trend-analysis",
    version: 1,
    system: r#"You are an expert analyst of YouTube trending videos who advises small creators.
You receive a JSON list of currently trending videos (title, description, channel, view count, publish time).

Identify:
- the single dominant theme shared by most of the videos,
- one emerging trend that is smaller but gaining momentum,
- exactly 5 video breakdowns, choosing the five most instructive videos. For each give its title,
  its format (e.g. "challenge", "reaction", "tutorial", "music video"), the main reason it is
  trending, and an angle a small creator with a modest budget could adapt.

Your ENTIRE response MUST be a single JSON object that validates against this JSON schema:
{{schema}}

Every string must be non-empty. Do not include any other text."#,
    user: Some("Analyze the following trending video data:\n{{videos}}"),
};

pub const CONTENT_IDEAS: PromptTemplate = PromptTemplate {
    name: "content-ideas",
    version: 1,
    system: r#"You are a helpful content idea generator for beginner creators.
Based on the following information, suggest exactly 5 unique and engaging content ideas.
Each idea must have a concise title and a short description of 1-2 sentences.
Format your response as a JSON object with a single key "ideas" containing a list of exactly 5
objects with the keys "title" and "short_description". It must validate against this JSON schema:
{{schema}}
{{trend_context}}
Creator's Profile:
- Primary Video Category: {{primary_category}}
- Ideal Content Creator Inspiration: {{ideal_creator}}
- Budget: {{budget}}
- Available Resources: {{resources}}
- Preferred Video Style: {{video_style}}"#,
    user: None,
};

/// Inserted into [`CONTENT_IDEAS`] when a cached trend analysis is available.
pub const TREND_CONTEXT: &str = r#"
CRITICAL CONTEXT: Use the following analysis of currently trending topics as your primary
inspiration. The ideas you generate MUST be relevant to these themes.

TRENDING TOPIC ANALYSIS:
{{analysis}}
"#;

pub const IDEA_DETAILS: PromptTemplate = PromptTemplate {
    name: "idea-details",
    version: 1,
    system: r##"You are an expert content idea elaborator. Based on the user's idea, generate a detailed video plan.
Your ENTIRE response MUST be a single, valid JSON object with these snake_case keys:
- video_title: a short, catchy, final title for the video
- video_description: a 2-3 sentence paragraph for the YouTube video description
- hook: a one-sentence hook to grab the viewer's attention at the start
- intro: a brief paragraph expanding on the hook
- main_content: a list of 4-6 bullet points outlining the core video segments, each a clear, actionable step
- outro: a brief paragraph to conclude the video
- call_to_action: a specific call to action (e.g. "Like, subscribe, and comment...")
- thumbnail_text: short, punchy text for the thumbnail (max 5 words)
- hashtags: a single string of relevant hashtags (e.g. "#Gaming #Challenge #MrBeast")

The object must validate against this JSON schema:
{{schema}}"##,
    user: Some(
        r#"Generate a detailed plan for the following idea:
- Topic: {{topic}}
- Brief Description: {{description}}
- Category: {{primary_category}}
- Inspiration: {{ideal_creator}}
- Budget: {{budget}}
- Resources: {{resources}}
- Style: {{video_style}}"#,
    ),
};
