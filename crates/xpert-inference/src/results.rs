//! Typed results for each prompt kind.
//!
//! Gateway responses carry arbitrary JSON. Each prompt kind has one result
//! type with a `from_json` boundary that either yields exactly that shape or
//! an [`Error::Validation`].

use serde_json::Value as JsonValue;

use xpert_core::{Error, Result};

/// Seniority classification for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeniorityResult {
    /// Label as returned by the model, trimmed. Not checked against the
    /// controlled vocabulary.
    pub seniority: String,
}

impl SeniorityResult {
    /// Expects `{"seniority": "<non-empty string>"}`.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let seniority = value
            .get("seniority")
            .ok_or_else(|| Error::Validation("missing key 'seniority'".to_string()))?
            .as_str()
            .ok_or_else(|| Error::Validation("'seniority' is not a string".to_string()))?
            .trim();

        if seniority.is_empty() {
            return Err(Error::Validation("'seniority' is empty".to_string()));
        }

        Ok(Self {
            seniority: seniority.to_string(),
        })
    }
}

/// Tag labels generated for a whole profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagListResult {
    /// Trimmed, non-empty labels in reply order.
    pub tags: Vec<String>,
}

impl TagListResult {
    /// Expects `{"tags": [..]}`.
    ///
    /// Non-string entries are skipped; strings are trimmed and blank ones
    /// dropped. Duplicates are kept.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let entries = value
            .get("tags")
            .ok_or_else(|| Error::Validation("missing key 'tags'".to_string()))?
            .as_array()
            .ok_or_else(|| Error::Validation("'tags' is not an array".to_string()))?;

        let tags = entries
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Ok(Self { tags })
    }
}

/// Answer to a disambiguation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguationResult {
    /// Candidate id picked by the model, or `None` when it declined.
    pub id: Option<String>,
}

impl DisambiguationResult {
    /// Expects `{"relevant_expert_id": {"id": "<id>" | null}}`.
    ///
    /// A null, empty, or literal `"null"` id is a valid "no match" answer.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let inner = value
            .get("relevant_expert_id")
            .ok_or_else(|| Error::Validation("missing key 'relevant_expert_id'".to_string()))?;
        if !inner.is_object() {
            return Err(Error::Validation(
                "'relevant_expert_id' is not an object".to_string(),
            ));
        }

        let id = match inner.get("id") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("null") {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            Some(other) => {
                return Err(Error::Validation(format!(
                    "'relevant_expert_id.id' has unexpected type: {}",
                    other
                )))
            }
        };

        Ok(Self { id })
    }
}
