//! Shared data models for the trend analyzer backend.
//!
//! This crate provides Serde-serializable types for:
//! - Region codes and trending content types
//! - Video records fetched from the trending API
//! - LLM trend analyses and the sentinel error document
//! - Cached region documents persisted by the cache writer
//! - Creator profiles, content ideas and detailed idea plans
//! - User accounts and login sessions

pub mod analysis;
pub mod error;
pub mod idea;
pub mod region;
pub mod trend_cache;
pub mod user;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisDocument, AnalysisOutcome, VideoBreakdown, BREAKDOWN_COUNT};
pub use error::{ModelError, ModelResult};
pub use idea::{
    CreatorProfile, Idea, IdeaDetailsRequest, IdeaList, IdeaPlan, IDEA_COUNT,
};
pub use region::{ContentType, RegionCode};
pub use trend_cache::CachedRegionDocument;
pub use user::{Session, User, UserProfile};
pub use video::VideoRecord;

use validator::{ValidationErrors, ValidationErrorsKind};

/// Flatten `validator` errors into `field -> messages`, sorted by field name.
///
/// Nested struct errors are reported under their own field names (flattened
/// request bodies stay flat); list entries are prefixed `field[i].`.
/// Used by the API layer for 400 bodies and by the LLM layer for log lines.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<(String, Vec<String>)> {
    let mut fields = Vec::new();
    collect_messages(errors, "", &mut fields);
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

fn collect_messages(
    errors: &ValidationErrors,
    prefix: &str,
    out: &mut Vec<(String, Vec<String>)>,
) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid value ({})", e.code))
                    })
                    .collect();
                out.push((format!("{prefix}{field}"), messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, prefix, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect_messages(inner, &format!("{prefix}{field}[{index}]."), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_validation_messages_flatten_nested_profile() {
        let request = IdeaDetailsRequest {
            topic: String::new(),
            description: "d".to_string(),
            profile: CreatorProfile::default(),
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<String> = validation_messages(&errors)
            .into_iter()
            .map(|(field, _)| field)
            .collect();
        assert!(fields.contains(&"topic".to_string()));
        assert!(fields.contains(&"budget".to_string()));
        assert!(!fields.contains(&"description".to_string()));
    }

    #[test]
    fn test_validation_messages_prefix_list_entries() {
        let mut list = IdeaList {
            ideas: vec![
                Idea {
                    title: "t".to_string(),
                    short_description: "d".to_string(),
                };
                5
            ],
        };
        list.ideas[3].title.clear();
        let errors = list.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "ideas[3].title");
    }
}
