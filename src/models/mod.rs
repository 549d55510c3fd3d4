//! Data models for the tripwise service
//!
//! - Request: inbound travel request and its syntactic constraints
//! - Trip type: the recognised travel styles
//! - Cost: estimator cost breakdowns
//! - Plan: the validated, generated travel plan

pub mod cost;
pub mod plan;
pub mod request;
pub mod trip_type;

// Re-export all public types for convenient access
pub use cost::{BudgetEstimate, CostBreakdown};
pub use plan::{PlanBudget, TravelPlan};
pub use request::{RawTravelRequest, RequestError, TravelRequest};
pub use trip_type::TripType;
