//! Creator profiles and generated content ideas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of ideas a suggestion request must yield.
pub const IDEA_COUNT: u64 = 5;

/// What a creator told us about themselves. Request-scoped, never persisted.
///
/// Missing JSON keys deserialize to empty strings so that validation, not the
/// JSON extractor, reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreatorProfile {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub primary_category: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub ideal_creator: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub budget: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub resources: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub video_style: String,
}

/// A short content idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct Idea {
    /// Concise, catchy video title
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    /// One or two sentences describing the video
    #[serde(alias = "description")]
    #[validate(length(min = 1, message = "short_description must not be empty"))]
    pub short_description: String,
}

/// The object the LLM must return for an idea suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct IdeaList {
    /// Exactly five ideas
    #[validate(
        length(equal = 5, message = "ideas must contain exactly 5 entries"),
        nested
    )]
    pub ideas: Vec<Idea>,
}

/// Detailed plan for one chosen idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct IdeaPlan {
    /// A short, catchy, final title for the video
    #[validate(length(min = 1, message = "video_title must not be empty"))]
    pub video_title: String,

    /// A 2-3 sentence paragraph for the video description
    #[validate(length(min = 1, message = "video_description must not be empty"))]
    pub video_description: String,

    /// A one-sentence hook to grab attention at the start
    #[validate(length(min = 1, message = "hook must not be empty"))]
    pub hook: String,

    /// A brief paragraph expanding on the hook
    #[validate(length(min = 1, message = "intro must not be empty"))]
    pub intro: String,

    /// 4-6 bullet points outlining the core video segments
    #[validate(length(
        min = 4,
        max = 6,
        message = "main_content must contain 4 to 6 entries"
    ))]
    pub main_content: Vec<String>,

    /// A brief paragraph to conclude the video
    #[validate(length(min = 1, message = "outro must not be empty"))]
    pub outro: String,

    /// A specific call to action
    #[validate(length(min = 1, message = "call_to_action must not be empty"))]
    pub call_to_action: String,

    /// Short, punchy thumbnail text (max 5 words)
    #[validate(length(min = 1, message = "thumbnail_text must not be empty"))]
    pub thumbnail_text: String,

    /// A single string of relevant hashtags
    #[validate(length(min = 1, message = "hashtags must not be empty"))]
    pub hashtags: String,
}

/// Request to expand one idea into a detailed plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct IdeaDetailsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub topic: String,

    #[serde(default, alias = "short_description")]
    #[validate(length(min = 1, message = "This field is required."))]
    pub description: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub profile: CreatorProfile,
}
