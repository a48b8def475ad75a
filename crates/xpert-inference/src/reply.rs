//! Unwrapping and strict parsing of model replies.
//!
//! Models in JSON mode still occasionally wrap their answer in a markdown
//! code fence, with or without a `json` language tag. The wrapper is removed
//! before the body is handed to `serde_json`; anything else is a parse error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use xpert_core::{Error, Result};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[ \t]*(?i:json)?[ \t]*\r?\n?(.*?)\s*```$").expect("valid fence regex")
});

/// Remove a surrounding code fence (and its `json` tag) if present.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a model reply as JSON after removing the fence wrapper.
///
/// Replies that are not JSON, including empty replies, become
/// [`Error::Parse`] with a short excerpt of the offending text.
pub fn parse_json_reply(reply: &str) -> Result<JsonValue> {
    let body = strip_code_fence(reply);
    serde_json::from_str(body).map_err(|e| {
        let excerpt: String = body.chars().take(120).collect();
        Error::Parse(format!("{} in reply: {:?}", e, excerpt))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_untouched() {
        assert_eq!(strip_code_fence(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_fence_with_json_tag() {
        let reply = "```json\n{\"seniority\": \"Senior\"}\n```";
        assert_eq!(strip_code_fence(reply), "{\"seniority\": \"Senior\"}");
    }

    #[test]
    fn test_strip_fence_without_tag() {
        let reply = "```\n{\"tags\": []}\n```";
        assert_eq!(strip_code_fence(reply), "{\"tags\": []}");
    }

    #[test]
    fn test_strip_fence_uppercase_tag_and_padding() {
        let reply = "  \n```JSON {\"x\": true} ```  \n";
        assert_eq!(strip_code_fence(reply), "{\"x\": true}");
    }

    #[test]
    fn test_json_word_inside_values_is_kept() {
        let reply = "```json\n{\"tags\": [\"json\", \"JSON Schema\"]}\n```";
        let value = parse_json_reply(reply).unwrap();
        assert_eq!(value, json!({"tags": ["json", "JSON Schema"]}));
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_json_reply("Sure! Here is the answer: Senior").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(parse_json_reply("   ").unwrap_err(), Error::Parse(_)));
        assert!(matches!(parse_json_reply("```json\n```").unwrap_err(), Error::Parse(_)));
    }

    #[test]
    fn test_parse_accepts_non_object_json() {
        assert_eq!(parse_json_reply("[1, 2]").unwrap(), json!([1, 2]));
    }
}
