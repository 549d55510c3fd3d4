//! Generated travel plan
//!
//! The plan body is produced by the generative capability and is returned to
//! callers exactly as generated. [`TravelPlan`] can only be built by the plan
//! validator, so holding one means the structural checks passed.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const REQUIRED_PLAN_KEYS: [&str; 6] = [
    "trip_summary",
    "transportation",
    "accommodation",
    "itinerary",
    "budget_breakdown",
    "recommendations",
];

pub const REQUIRED_BUDGET_KEYS: [&str; 6] = [
    "transportation",
    "accommodation",
    "food",
    "activities",
    "buffer",
    "total_estimated",
];

/// Typed view of the plan's `budget_breakdown`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanBudget {
    pub transportation: f64,
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub buffer: f64,
    pub total_estimated: f64,
}

impl PlanBudget {
    pub fn category_sum(&self) -> f64 {
        self.transportation + self.accommodation + self.food + self.activities
    }

    /// Whether `total_estimated` matches categories plus buffer within
    /// `max(₹1, 1%)`
    pub fn is_consistent(&self) -> bool {
        let expected = self.category_sum() + self.buffer;
        let tolerance = (expected.abs() * 0.01).max(1.0);
        (self.total_estimated - expected).abs() <= tolerance
    }

    /// The larger of the stated total and the sum of its parts
    pub fn effective_total(&self) -> f64 {
        self.total_estimated.max(self.category_sum() + self.buffer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelPlan {
    body: Map<String, Value>,
    budget: PlanBudget,
}

impl TravelPlan {
    pub(crate) fn new(body: Map<String, Value>, budget: PlanBudget) -> Self {
        Self { body, budget }
    }

    pub fn budget(&self) -> &PlanBudget {
        &self.budget
    }

    pub fn total_estimated(&self) -> f64 {
        self.budget.total_estimated
    }

    pub fn trip_summary(&self) -> Option<&Value> {
        self.body.get("trip_summary")
    }

    pub fn itinerary(&self) -> &[Value] {
        self.body
            .get("itinerary")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

impl Serialize for TravelPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
