//! Generative capability boundary
//!
//! Everything the pipeline asks of the language model goes through
//! [`GenerativeCapability`]: one call, one JSON object back or a typed failure.
//! The pipeline never looks behind this trait.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod chat_completions;
pub mod scripted;

pub use chat_completions::ChatCompletionsClient;
pub use scripted::ScriptedCapability;

/// What a prompt is for. Used for logging and by scripted capabilities to
/// route answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptPurpose {
    SourceLocation,
    DestinationLocation,
    TripType,
    DateLogic,
    PlanGeneration,
}

impl PromptPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPurpose::SourceLocation => "source_location",
            PromptPurpose::DestinationLocation => "destination_location",
            PromptPurpose::TripType => "trip_type",
            PromptPurpose::DateLogic => "date_logic",
            PromptPurpose::PlanGeneration => "plan_generation",
        }
    }
}

impl fmt::Display for PromptPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully specified request to the capability.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub purpose: PromptPurpose,
    pub system_instruction: String,
    pub user_instruction: String,
    /// Example of the JSON object the answer must follow
    pub response_schema_hint: Value,
    pub temperature: f64,
    pub timeout: Duration,
}

/// Failures at the capability boundary
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no content")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("response is JSON but not an object")]
    NotAnObject,

    #[error("no scripted answer for {0}")]
    Unscripted(PromptPurpose),
}

/// An external generative-language capability answering with JSON objects.
#[async_trait]
pub trait GenerativeCapability: Send + Sync {
    async fn generate(&self, spec: &PromptSpec) -> Result<Map<String, Value>, CapabilityError>;

    /// Model identifier reported on the health surface
    fn model_name(&self) -> &str;
}

/// Parse raw model output into a JSON object.
///
/// Models occasionally wrap JSON in a markdown fence even in JSON mode, so a
/// single surrounding fence is tolerated.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, CapabilityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CapabilityError::EmptyResponse);
    }
    let body = strip_code_fence(trimmed);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CapabilityError::NotAnObject),
        Err(e) => Err(CapabilityError::MalformedJson(e.to_string())),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let map = parse_json_object(r#"{"is_valid": true}"#).unwrap();
        assert_eq!(map.get("is_valid"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_parse_fenced_object() {
        let map = parse_json_object("```json\n{\"reason\": \"ok\"}\n```").unwrap();
        assert_eq!(map.get("reason").and_then(Value::as_str), Some("ok"));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            parse_json_object("[1, 2]"),
            Err(CapabilityError::NotAnObject)
        ));
        assert!(matches!(
            parse_json_object("   "),
            Err(CapabilityError::EmptyResponse)
        ));
        assert!(matches!(
            parse_json_object(r#"{"is_valid": tru"#),
            Err(CapabilityError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_purpose_labels() {
        assert_eq!(PromptPurpose::PlanGeneration.to_string(), "plan_generation");
        assert_eq!(PromptPurpose::SourceLocation.as_str(), "source_location");
    }
}
