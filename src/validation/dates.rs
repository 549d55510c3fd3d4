//! Travel window plausibility

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{SemanticValidator, ValidationOutcome, non_empty, technical_failure};
use crate::llm::PromptPurpose;
use crate::prompts;

const UNKNOWN_SEASON: &str = "Unknown";
const NO_FESTIVALS: &str = "None";

/// Accepted travel period, annotated with season and festival context
#[derive(Debug, Clone, PartialEq)]
pub struct TravelWindow {
    pub start: NaiveDate,
    /// Inclusive last day of the trip
    pub end: NaiveDate,
    pub season_info: String,
    pub festival_info: String,
}

#[derive(Debug, Deserialize)]
struct DateVerdict {
    is_valid: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    suggested_start_date: Option<String>,
    #[serde(default)]
    season_info: Option<String>,
    #[serde(default)]
    festival_info: Option<String>,
}

impl SemanticValidator {
    /// Judge whether the window starting at `start` is a sensible trip.
    ///
    /// `today` is passed to the model so past start dates can be flagged;
    /// no local calendar check is made.
    #[instrument(skip(self))]
    pub async fn validate_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        duration: u32,
        today: NaiveDate,
    ) -> ValidationOutcome<TravelWindow> {
        let purpose = PromptPurpose::DateLogic;
        let verdict: DateVerdict = match self
            .ask(
                purpose,
                prompts::DATE_SYSTEM.to_string(),
                prompts::date_user(start, duration, end, today),
                prompts::date_hint(),
            )
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => return technical_failure(purpose, &e),
        };

        if !verdict.is_valid {
            let reason = non_empty(verdict.reason)
                .unwrap_or_else(|| format!("Travel period starting {start} is not valid"));
            warn!("Rejected travel window {} to {}: {}", start, end, reason);
            let suggestion = non_empty(verdict.suggested_start_date)
                .filter(|s| s.parse::<NaiveDate>().is_ok());
            return ValidationOutcome::invalid(reason, suggestion);
        }

        let window = TravelWindow {
            start,
            end,
            season_info: non_empty(verdict.season_info)
                .unwrap_or_else(|| UNKNOWN_SEASON.to_string()),
            festival_info: non_empty(verdict.festival_info)
                .unwrap_or_else(|| NO_FESTIVALS.to_string()),
        };
        debug!(
            "Travel window accepted: season '{}', festivals '{}'",
            window.season_info, window.festival_info
        );
        ValidationOutcome::Valid(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedCapability;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn run(verdict: Value) -> (ValidationOutcome<TravelWindow>, Arc<ScriptedCapability>) {
        let capability =
            Arc::new(ScriptedCapability::new("stub").answer(PromptPurpose::DateLogic, verdict));
        let outcome = SemanticValidator::new(capability.clone(), Duration::from_secs(5), 0.1)
            .validate_dates(date(2024, 12, 25), date(2024, 12, 29), 5, date(2024, 11, 1))
            .await;
        (outcome, capability)
    }

    #[tokio::test]
    async fn test_accepts_window_with_context() {
        let (outcome, capability) = run(json!({
            "is_valid": true,
            "season_info": "Winter",
            "festival_info": "Christmas"
        }))
        .await;

        assert_eq!(
            outcome,
            ValidationOutcome::Valid(TravelWindow {
                start: date(2024, 12, 25),
                end: date(2024, 12, 29),
                season_info: "Winter".to_string(),
                festival_info: "Christmas".to_string(),
            })
        );

        let prompt = &capability.calls()[0].user_instruction;
        assert!(prompt.contains("End date: 2024-12-29"));
        assert!(prompt.contains("Today: 2024-11-01"));
    }

    #[tokio::test]
    async fn test_missing_context_gets_defaults() {
        let (outcome, _) = run(json!({"is_valid": true})).await;
        match outcome {
            ValidationOutcome::Valid(window) => {
                assert_eq!(window.season_info, "Unknown");
                assert_eq!(window.festival_info, "None");
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_past_date_rejected_with_suggestion() {
        let (outcome, _) = run(json!({
            "is_valid": false,
            "reason": "Start date is in the past",
            "suggested_start_date": "2025-01-10"
        }))
        .await;
        assert_eq!(
            outcome,
            ValidationOutcome::invalid("Start date is in the past", Some("2025-01-10".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unparseable_suggestion_dropped() {
        let (outcome, _) = run(json!({
            "is_valid": false,
            "suggested_start_date": "YYYY-MM-DD if needed"
        }))
        .await;
        match outcome {
            ValidationOutcome::Invalid { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("expected invalid, got {other:?}"),
        }
    }
}
