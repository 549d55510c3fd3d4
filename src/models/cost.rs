//! Cost breakdown model used by the budget estimator

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Share of the subtotal added as contingency
pub const BUFFER_RATE: f64 = 0.10;
/// Recommended budget relative to the minimum
pub const RECOMMENDED_MARKUP: f64 = 1.20;

/// Per-category trip costs in rupees.
///
/// Only the categories are stored; `subtotal`, `buffer` and `total` are always
/// recomputed from them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    pub transportation: f64,
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub local_transport: f64,
}

impl CostBreakdown {
    pub fn subtotal(&self) -> f64 {
        self.transportation + self.accommodation + self.food + self.activities + self.local_transport
    }

    pub fn buffer(&self) -> f64 {
        self.subtotal() * BUFFER_RATE
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.buffer()
    }

    pub fn categories(&self) -> [(&'static str, f64); 5] {
        [
            ("transportation", self.transportation),
            ("accommodation", self.accommodation),
            ("food", self.food),
            ("activities", self.activities),
            ("local_transport", self.local_transport),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.categories().iter().all(|(_, v)| v.is_finite()) && self.total().is_finite()
    }
}

impl Serialize for CostBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CostBreakdown", 8)?;
        for (name, value) in self.categories() {
            state.serialize_field(name, &value)?;
        }
        state.serialize_field("subtotal", &self.subtotal())?;
        state.serialize_field("buffer", &self.buffer())?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

/// Result of a budget estimate
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEstimate {
    pub cost_breakdown: CostBreakdown,
    /// Human readable summary
    pub reason: String,
    /// Set when the fixed fallback was used instead of the formula
    pub is_fallback: bool,
}

impl BudgetEstimate {
    pub fn minimum_required(&self) -> f64 {
        self.cost_breakdown.total()
    }

    pub fn recommended_budget(&self) -> f64 {
        self.minimum_required() * RECOMMENDED_MARKUP
    }
}

impl Serialize for BudgetEstimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BudgetEstimate", 5)?;
        state.serialize_field("minimum_required", &self.minimum_required())?;
        state.serialize_field("recommended_budget", &self.recommended_budget())?;
        state.serialize_field("cost_breakdown", &self.cost_breakdown)?;
        state.serialize_field("reason", &self.reason)?;
        state.serialize_field("is_fallback", &self.is_fallback)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown() -> CostBreakdown {
        CostBreakdown {
            transportation: 9000.0,
            accommodation: 10000.0,
            food: 7500.0,
            activities: 4500.0,
            local_transport: 3000.0,
        }
    }

    #[test]
    fn test_derived_totals() {
        let costs = breakdown();
        assert_eq!(costs.subtotal(), 34000.0);
        assert!((costs.buffer() - 3400.0).abs() < 1e-9);
        assert!((costs.total() - 37400.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_follows_categories() {
        let mut costs = breakdown();
        costs.food += 1000.0;
        assert!((costs.total() - 38500.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_derived_fields() {
        let value = serde_json::to_value(breakdown()).unwrap();
        assert_eq!(value["local_transport"], 3000.0);
        assert_eq!(value["subtotal"], 34000.0);
        assert!(value.get("total").is_some());
    }

    #[test]
    fn test_estimate_recommended() {
        let estimate = BudgetEstimate {
            cost_breakdown: breakdown(),
            reason: String::new(),
            is_fallback: false,
        };
        assert!((estimate.recommended_budget() - 44880.0).abs() < 1e-6);
    }
}
