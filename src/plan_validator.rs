//! Structural verification of generated plans
//!
//! Generated output is untrusted. This is the parser boundary between it and
//! the rest of the service: a candidate either becomes a [`TravelPlan`] or is
//! rejected, never repaired.
//!
//! Two tiers of checks exist. Required keys, required budget keys, numeric
//! budget amounts, budget arithmetic and the itinerary length are always
//! fatal. Consistency findings (accommodation shape, itinerary dates) are
//! fatal only in strict mode and otherwise only logged.

use chrono::{Days, NaiveDate};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::plan::{REQUIRED_BUDGET_KEYS, REQUIRED_PLAN_KEYS};
use crate::models::{PlanBudget, TravelPlan};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("Plan generation reported an error: {0}")]
    Reported(String),

    #[error("Missing required key: {0}")]
    MissingKey(&'static str),

    #[error("Missing budget key: {0}")]
    MissingBudgetKey(&'static str),

    #[error("Field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("Budget total {total:.0} does not match categories plus buffer {expected:.0}")]
    BudgetMismatch { total: f64, expected: f64 },

    #[error("Itinerary has {actual} days but the trip lasts {expected}")]
    ItineraryLength { expected: u32, actual: usize },

    #[error("Plan is inconsistent: {}", .0.join("; "))]
    Inconsistent(Vec<String>),
}

/// Accepts or rejects generated plan candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanValidator {
    strict: bool,
}

impl PlanValidator {
    /// `strict` makes consistency findings fatal
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn validate(
        &self,
        candidate: Map<String, Value>,
        start_date: NaiveDate,
        duration: u32,
    ) -> Result<TravelPlan, StructuralError> {
        if let Some(reported) = candidate.get("error") {
            let message = match reported {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(StructuralError::Reported(message));
        }

        for key in REQUIRED_PLAN_KEYS {
            if !candidate.contains_key(key) {
                return Err(StructuralError::MissingKey(key));
            }
        }

        let budget = read_budget(&candidate["budget_breakdown"])?;
        if !budget.is_consistent() {
            return Err(StructuralError::BudgetMismatch {
                total: budget.total_estimated,
                expected: budget.category_sum() + budget.buffer,
            });
        }

        let itinerary = candidate["itinerary"]
            .as_array()
            .ok_or_else(|| wrong_type("itinerary", "an array"))?;
        if itinerary.len() != duration as usize {
            return Err(StructuralError::ItineraryLength {
                expected: duration,
                actual: itinerary.len(),
            });
        }

        let findings = consistency_findings(&candidate, start_date);
        if !findings.is_empty() {
            if self.strict {
                return Err(StructuralError::Inconsistent(findings));
            }
            for finding in &findings {
                warn!("Generated plan inconsistency: {}", finding);
            }
        }

        debug!(
            "Plan accepted: {} days, total ₹{:.0}",
            itinerary.len(),
            budget.total_estimated
        );
        Ok(TravelPlan::new(candidate, budget))
    }
}

fn wrong_type(field: impl Into<String>, expected: &'static str) -> StructuralError {
    StructuralError::WrongType {
        field: field.into(),
        expected,
    }
}

fn read_budget(value: &Value) -> Result<PlanBudget, StructuralError> {
    let breakdown = value
        .as_object()
        .ok_or_else(|| wrong_type("budget_breakdown", "an object"))?;

    let mut amounts = [0.0; REQUIRED_BUDGET_KEYS.len()];
    for (slot, key) in amounts.iter_mut().zip(REQUIRED_BUDGET_KEYS) {
        let amount = breakdown
            .get(key)
            .ok_or(StructuralError::MissingBudgetKey(key))?;
        *slot = amount
            .as_f64()
            .ok_or_else(|| wrong_type(format!("budget_breakdown.{key}"), "a number"))?;
    }

    let [transportation, accommodation, food, activities, buffer, total_estimated] = amounts;
    Ok(PlanBudget {
        transportation,
        accommodation,
        food,
        activities,
        buffer,
        total_estimated,
    })
}

fn consistency_findings(plan: &Map<String, Value>, start_date: NaiveDate) -> Vec<String> {
    let mut findings = Vec::new();

    if !plan["accommodation"].is_array() {
        findings.push("accommodation is not an array".to_string());
    }

    if let Some(days) = plan["itinerary"].as_array() {
        for (index, day) in days.iter().enumerate() {
            let expected = start_date.checked_add_days(Days::new(index as u64));
            let actual = day
                .get("date")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<NaiveDate>().ok());
            if actual.is_none() || actual != expected {
                findings.push(format!(
                    "itinerary day {} has date {} instead of {}",
                    index + 1,
                    day.get("date").map_or_else(|| "none".to_string(), Value::to_string),
                    expected.map_or_else(|| "none".to_string(), |d| d.to_string()),
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
    }

    fn itinerary(days: u32) -> Value {
        (0..days)
            .map(|i| {
                json!({
                    "day": i + 1,
                    "date": start().checked_add_days(Days::new(u64::from(i))).unwrap().to_string(),
                    "activities": [],
                    "total_day_cost": 1000
                })
            })
            .collect()
    }

    fn plan(days: u32) -> Value {
        json!({
            "trip_summary": {"source": "Mumbai", "destination": "Delhi"},
            "transportation": {"outbound": {"mode": "train"}},
            "accommodation": [{"name": "Hotel", "total_cost": 12000}],
            "itinerary": itinerary(days),
            "budget_breakdown": {
                "transportation": 12000,
                "accommodation": 12000,
                "food": 7500,
                "activities": 4500,
                "buffer": 3600,
                "total_estimated": 39600
            },
            "recommendations": {"packing_list": []}
        })
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn validate(value: Value, strict: bool) -> Result<TravelPlan, StructuralError> {
        PlanValidator::new(strict).validate(object(value), start(), 5)
    }

    #[test]
    fn test_accepts_well_formed_plan() {
        let body = plan(5);
        let accepted = validate(body.clone(), true).unwrap();
        assert_eq!(accepted.total_estimated(), 39600.0);
        assert_eq!(accepted.itinerary().len(), 5);
        assert_eq!(serde_json::to_value(&accepted).unwrap(), body);
    }

    #[test]
    fn test_extra_keys_are_kept() {
        let mut body = plan(5);
        body["notes"] = json!("bring an umbrella");
        let accepted = validate(body, true).unwrap();
        assert_eq!(accepted.body()["notes"], "bring an umbrella");
    }

    #[rstest]
    #[case::trip_summary("trip_summary")]
    #[case::transportation("transportation")]
    #[case::accommodation("accommodation")]
    #[case::itinerary("itinerary")]
    #[case::budget_breakdown("budget_breakdown")]
    #[case::recommendations("recommendations")]
    fn test_missing_top_level_key(#[case] key: &'static str) {
        let mut body = object(plan(5));
        body.remove(key);
        let result = PlanValidator::default().validate(body, start(), 5);
        assert_eq!(result.unwrap_err(), StructuralError::MissingKey(key));
    }

    #[rstest]
    #[case::buffer("buffer")]
    #[case::total("total_estimated")]
    #[case::food("food")]
    fn test_missing_budget_key(#[case] key: &'static str) {
        let mut body = plan(5);
        body["budget_breakdown"].as_object_mut().unwrap().remove(key);
        assert_eq!(
            validate(body, false).unwrap_err(),
            StructuralError::MissingBudgetKey(key)
        );
    }

    #[rstest]
    #[case::string_amount("/budget_breakdown/food", json!("7500"))]
    #[case::null_amount("/budget_breakdown/total_estimated", Value::Null)]
    #[case::budget_array("/budget_breakdown", json!([1, 2, 3]))]
    #[case::itinerary_object("/itinerary", json!({"day": 1}))]
    fn test_ill_typed_fields(#[case] pointer: &str, #[case] replacement: Value) {
        let mut body = plan(5);
        *body.pointer_mut(pointer).unwrap() = replacement;
        assert!(matches!(
            validate(body, false),
            Err(StructuralError::WrongType { .. })
        ));
    }

    #[rstest]
    #[case::short(4)]
    #[case::long(6)]
    #[case::empty(0)]
    fn test_itinerary_length_mismatch(#[case] days: u32) {
        assert_eq!(
            validate(plan(days), false).unwrap_err(),
            StructuralError::ItineraryLength {
                expected: 5,
                actual: days as usize
            }
        );
    }

    #[test]
    fn test_reported_error_key() {
        let mut body = plan(5);
        body["error"] = json!("cannot plan this trip");
        assert_eq!(
            validate(body, false).unwrap_err(),
            StructuralError::Reported("cannot plan this trip".to_string())
        );
    }

    #[test]
    fn test_truncated_plan() {
        let body = json!({"trip_summary": {"source": "Mumbai"}});
        assert_eq!(
            validate(body, false).unwrap_err(),
            StructuralError::MissingKey("transportation")
        );
    }

    #[test]
    fn test_inconsistency_only_fatal_when_strict() {
        let mut body = plan(5);
        body["itinerary"][2]["date"] = json!("2025-01-30");
        body["accommodation"] = json!({"name": "Hotel"});

        match validate(body.clone(), true) {
            Err(StructuralError::Inconsistent(findings)) => {
                assert_eq!(findings.len(), 2);
                assert!(findings[1].contains("day 3"));
            }
            other => panic!("expected inconsistency, got {other:?}"),
        }

        let lenient = validate(body, false).unwrap();
        assert_eq!(lenient.total_estimated(), 39600.0);
    }

    #[rstest]
    #[case::understated_total(json!(40000), json!(500000))]
    #[case::overstated_total(json!(90000), json!(7500))]
    fn test_budget_arithmetic_always_fatal(#[case] total: Value, #[case] food: Value) {
        let mut body = plan(5);
        body["budget_breakdown"]["total_estimated"] = total;
        body["budget_breakdown"]["food"] = food;

        for strict in [true, false] {
            assert!(matches!(
                validate(body.clone(), strict),
                Err(StructuralError::BudgetMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_float_amounts_accepted() {
        let mut body = plan(5);
        body["budget_breakdown"]["buffer"] = json!(3600.4);
        assert!(validate(body, true).is_ok());
    }
}
