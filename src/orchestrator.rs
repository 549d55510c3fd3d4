//! Plan orchestration pipeline
//!
//! Runs a validated [`TravelRequest`] through the semantic checks, the budget
//! floor, generation, structural validation and the budget ceiling, in that
//! order. The first failing stage ends the run with a [`PlanFailure`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::budget::{self, format_inr};
use crate::config::{PlannerConfig, TripwiseConfig};
use crate::llm::{CapabilityError, GenerativeCapability, PromptPurpose, PromptSpec};
use crate::models::{CostBreakdown, TravelPlan, TravelRequest, TripType};
use crate::plan_validator::PlanValidator;
use crate::prompts;
use crate::validation::{LocationRole, SemanticValidator, ValidationOutcome};

/// Everything generation needs to know about an accepted request, with
/// canonicalised values in place of the caller's originals
#[derive(Debug, Clone, PartialEq)]
pub struct PlanBrief {
    pub source: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: u32,
    pub adults: u32,
    pub children: u32,
    pub budget: f64,
    pub trip_type: TripType,
    pub season_info: String,
    pub festival_info: String,
}

/// Pipeline states in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Init,
    SourceValid,
    DestinationValid,
    TripTypeValid,
    DateValid,
    BudgetFloorChecked,
    Generated,
    StructurallyValid,
    CeilingChecked,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    InvalidSource,
    InvalidDestination,
    InvalidTripType,
    InvalidDates,
    InsufficientBudget,
    PlanGenerationFailed,
    InternalError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::InvalidSource => "invalid_source",
            FailureKind::InvalidDestination => "invalid_destination",
            FailureKind::InvalidTripType => "invalid_trip_type",
            FailureKind::InvalidDates => "invalid_dates",
            FailureKind::InsufficientBudget => "insufficient_budget",
            FailureKind::PlanGenerationFailed => "plan_generation_failed",
            FailureKind::InternalError => "internal_error",
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            FailureKind::PlanGenerationFailed | FailureKind::InternalError
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal pipeline failure, serialised as the error response body
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{kind}: {message}")]
pub struct PlanFailure {
    #[serde(rename = "error")]
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_breakdown: Option<CostBreakdown>,
}

impl PlanFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            required_budget: None,
            recommended_budget: None,
            cost_breakdown: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// Generic failure that exposes nothing about the cause
    pub fn internal() -> Self {
        Self::new(FailureKind::InternalError, "An unexpected error occurred")
    }

    fn rejected<T>(kind: FailureKind, label: &str, outcome: ValidationOutcome<T>) -> Self {
        match outcome {
            ValidationOutcome::Invalid { reason, suggestion } => {
                Self::new(kind, format!("{label}: {reason}")).with_suggestion(suggestion)
            }
            ValidationOutcome::Valid(_) => Self::internal(),
        }
    }
}

/// Sequences validation and generation for one request at a time.
///
/// Holds no per-request state; one instance is shared by all handlers.
pub struct PlanOrchestrator {
    capability: Arc<dyn GenerativeCapability>,
    validator: SemanticValidator,
    plan_validator: PlanValidator,
    planner: PlannerConfig,
    generation_timeout: Duration,
    generation_temperature: f64,
}

impl PlanOrchestrator {
    pub fn new(capability: Arc<dyn GenerativeCapability>, config: &TripwiseConfig) -> Self {
        let validator = SemanticValidator::new(
            capability.clone(),
            config.llm.validation_timeout(),
            config.llm.validation_temperature,
        );
        Self {
            capability,
            validator,
            plan_validator: PlanValidator::new(config.planner.strict_consistency),
            planner: config.planner.clone(),
            generation_timeout: config.llm.generation_timeout(),
            generation_temperature: config.llm.generation_temperature,
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.capability.model_name()
    }

    /// Run the pipeline with today's local date
    pub async fn run(&self, request: &TravelRequest) -> Result<TravelPlan, PlanFailure> {
        self.run_with_today(request, Local::now().date_naive()).await
    }

    /// Run the pipeline, telling the date check that today is `today`
    #[instrument(
        skip_all,
        fields(
            source = request.source(),
            destination = request.destination(),
            start_date = %request.start_date(),
            duration = request.duration(),
        )
    )]
    pub async fn run_with_today(
        &self,
        request: &TravelRequest,
        today: NaiveDate,
    ) -> Result<TravelPlan, PlanFailure> {
        let started = Instant::now();
        let mut stage = PipelineStage::Init;

        let result = self.execute(request, today, &mut stage).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(plan) => info!(
                "Plan generated in {:.3}s, {} days, total ₹{:.0}",
                elapsed,
                plan.itinerary().len(),
                plan.total_estimated()
            ),
            Err(failure) if failure.kind.is_client_error() => warn!(
                "Request rejected after {:?} in {:.3}s: {}",
                stage, elapsed, failure
            ),
            Err(failure) => error!(
                "Pipeline failed after {:?} in {:.3}s: {}",
                stage, elapsed, failure
            ),
        }
        result
    }

    async fn execute(
        &self,
        request: &TravelRequest,
        today: NaiveDate,
        stage: &mut PipelineStage,
    ) -> Result<TravelPlan, PlanFailure> {
        let source = match self
            .validator
            .validate_location(request.source(), LocationRole::Source)
            .await
        {
            ValidationOutcome::Valid(location) => location,
            invalid => {
                return Err(PlanFailure::rejected(
                    FailureKind::InvalidSource,
                    "Source location error",
                    invalid,
                ));
            }
        };
        advance(stage, PipelineStage::SourceValid);

        let destination = match self
            .validator
            .validate_location(request.destination(), LocationRole::Destination)
            .await
        {
            ValidationOutcome::Valid(location) => location,
            invalid => {
                return Err(PlanFailure::rejected(
                    FailureKind::InvalidDestination,
                    "Destination error",
                    invalid,
                ));
            }
        };
        advance(stage, PipelineStage::DestinationValid);

        let trip_type = match self.validator.validate_trip_type(request.trip_type()).await {
            ValidationOutcome::Valid(kind) => kind,
            invalid => {
                return Err(PlanFailure::rejected(
                    FailureKind::InvalidTripType,
                    "Trip type error",
                    invalid,
                ));
            }
        };
        advance(stage, PipelineStage::TripTypeValid);

        let window = match self
            .validator
            .validate_dates(
                request.start_date(),
                request.end_date(),
                request.duration(),
                today,
            )
            .await
        {
            ValidationOutcome::Valid(window) => window,
            invalid => {
                return Err(PlanFailure::rejected(
                    FailureKind::InvalidDates,
                    "Date error",
                    invalid,
                ));
            }
        };
        advance(stage, PipelineStage::DateValid);

        self.check_budget_floor(request)?;
        advance(stage, PipelineStage::BudgetFloorChecked);

        let brief = PlanBrief {
            source: source.name,
            destination: destination.name,
            start_date: window.start,
            end_date: window.end,
            duration: request.duration(),
            adults: request.adults(),
            children: request.children(),
            budget: request.budget(),
            trip_type,
            season_info: window.season_info,
            festival_info: window.festival_info,
        };

        let candidate = self.generate(&brief).await.map_err(|e| {
            error!("Plan generation call failed: {}", e);
            PlanFailure::new(
                FailureKind::PlanGenerationFailed,
                "Plan generation failed due to technical error",
            )
        })?;
        advance(stage, PipelineStage::Generated);

        let plan = self
            .plan_validator
            .validate(candidate, brief.start_date, brief.duration)
            .map_err(|e| {
                PlanFailure::new(
                    FailureKind::PlanGenerationFailed,
                    format!("Plan generation failed: {e}"),
                )
            })?;
        advance(stage, PipelineStage::StructurallyValid);

        self.check_budget_ceiling(&plan, request.budget())?;
        advance(stage, PipelineStage::CeilingChecked);

        advance(stage, PipelineStage::Done);
        Ok(plan)
    }

    /// Cheap pre-filter against obviously impossible budgets
    fn check_budget_floor(&self, request: &TravelRequest) -> Result<(), PlanFailure> {
        let estimate = budget::estimate(request.duration(), request.adults(), request.children());
        let minimum = estimate.minimum_required();
        debug!(
            "Budget floor: requested {}, minimum {}, floor ratio {}",
            format_inr(request.budget()),
            format_inr(minimum),
            self.planner.floor_ratio
        );

        if request.budget() < minimum * self.planner.floor_ratio {
            return Err(PlanFailure {
                required_budget: Some(minimum),
                recommended_budget: Some(estimate.recommended_budget()),
                cost_breakdown: Some(estimate.cost_breakdown),
                ..PlanFailure::new(
                    FailureKind::InsufficientBudget,
                    format!(
                        "Budget too low for this trip. Minimum required: {}",
                        format_inr(minimum)
                    ),
                )
            });
        }
        Ok(())
    }

    fn check_budget_ceiling(&self, plan: &TravelPlan, budget: f64) -> Result<(), PlanFailure> {
        let total = plan.budget().effective_total();
        if total > budget * self.planner.ceiling_ratio {
            return Err(PlanFailure {
                required_budget: Some(total),
                ..PlanFailure::new(
                    FailureKind::InsufficientBudget,
                    format!(
                        "Generated plan exceeds budget significantly. Required: {}, Available: {}",
                        format_inr(total),
                        format_inr(budget)
                    ),
                )
            });
        }
        Ok(())
    }

    async fn generate(
        &self,
        brief: &PlanBrief,
    ) -> Result<serde_json::Map<String, serde_json::Value>, CapabilityError> {
        let spec = PromptSpec {
            purpose: PromptPurpose::PlanGeneration,
            system_instruction: prompts::PLAN_SYSTEM.to_string(),
            user_instruction: prompts::plan_user(brief),
            response_schema_hint: prompts::plan_skeleton(brief),
            temperature: self.generation_temperature,
            timeout: self.generation_timeout,
        };

        match tokio::time::timeout(self.generation_timeout, self.capability.generate(&spec)).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout {
                seconds: self.generation_timeout.as_secs(),
            }),
        }
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!("Pipeline stage {:?} -> {:?}", stage, next);
    *stage = next;
}
