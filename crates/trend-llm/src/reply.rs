//! Parsing and validating JSON replies from the model.

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{LlmError, LlmResult};

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as `json` on the opening fence line.
    let inner = match inner.find('\n') {
        Some(newline) if !inner[..newline].contains('{') => &inner[newline + 1..],
        _ => inner.trim_start_matches("json"),
    };
    inner.trim_end().trim_end_matches("```").trim()
}

/// Parse `raw` as `T` and check its validation rules.
///
/// Tolerates code fences and prose around a single top-level JSON object.
pub fn parse_validated<T: DeserializeOwned + Validate>(raw: &str) -> LlmResult<T> {
    let text = strip_code_fence(raw);

    let parsed: T = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(first_err) => {
            let object = match (text.find('{'), text.rfind('}')) {
                (Some(start), Some(end)) if start < end => &text[start..=end],
                _ => return Err(LlmError::Parse(first_err.to_string())),
            };
            serde_json::from_str(object).map_err(|e| LlmError::Parse(e.to_string()))?
        }
    };

    parsed.validate().map_err(|errors| {
        let summary = trend_models::validation_messages(&errors)
            .into_iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        LlmError::Validation(summary)
    })?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use trend_models::{Idea, IdeaList};

    use super::*;

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    fn five_ideas() -> String {
        let ideas: Vec<Idea> = (1..=5)
            .map(|i| Idea {
                title: format!("Idea {i}"),
                short_description: "Do the thing.".to_string(),
            })
            .collect();
        serde_json::to_string(&IdeaList { ideas }).unwrap()
    }

    #[test]
    fn test_parse_fenced_and_wrapped_replies() {
        let fenced = format!("```json\n{}\n```", five_ideas());
        assert_eq!(parse_validated::<IdeaList>(&fenced).unwrap().ideas.len(), 5);

        let wrapped = format!("Sure! Here you go: {} Enjoy.", five_ideas());
        assert_eq!(parse_validated::<IdeaList>(&wrapped).unwrap().ideas.len(), 5);
    }

    #[test]
    fn test_non_json_is_parse_error() {
        let err = parse_validated::<IdeaList>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_schema_violation_is_validation_error() {
        let err = parse_validated::<IdeaList>(r#"{"ideas": [{"title": "a", "short_description": "b"}]}"#)
            .unwrap_err();
        match err {
            LlmError::Validation(summary) => assert!(summary.contains("ideas")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
