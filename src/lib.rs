//! Tripwise - validated travel plan generation for Indian destinations
//!
//! This library provides the request schema, the budget estimator, the
//! semantic validators backed by a generative language model, and the
//! orchestration pipeline that turns a travel request into a checked plan.

pub mod api;
pub mod budget;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod plan_validator;
pub mod prompts;
pub mod telemetry;
pub mod validation;
pub mod web;

// Re-export core types for public API
pub use config::TripwiseConfig;
pub use error::TripwiseError;
pub use llm::{ChatCompletionsClient, GenerativeCapability, ScriptedCapability};
pub use models::{RawTravelRequest, TravelPlan, TravelRequest, TripType};
pub use orchestrator::{FailureKind, PlanFailure, PlanOrchestrator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripwiseError>;
