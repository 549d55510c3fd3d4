//! HTTP endpoints: plan generation and health

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::VERSION;
use crate::models::{RawTravelRequest, TravelPlan};
use crate::orchestrator::{FailureKind, PlanFailure, PlanOrchestrator};

pub const SERVICE_NAME: &str = "Tripwise Indian Travel Planner";

pub const FEATURES: [&str; 6] = [
    "Comprehensive LLM-based validation",
    "Indian location verification",
    "Spelling correction",
    "Budget analysis",
    "Date logic validation",
    "Trip type validation",
];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
    pub features: Vec<&'static str>,
}

impl IntoResponse for PlanFailure {
    fn into_response(self) -> Response {
        let status = if self.kind.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

pub fn router(orchestrator: Arc<PlanOrchestrator>) -> Router {
    Router::new()
        .route("/generate-plan", post(generate_plan))
        .route("/health", get(health))
        .with_state(orchestrator)
}

async fn generate_plan(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
    payload: Result<Json<RawTravelRequest>, JsonRejection>,
) -> Result<Json<TravelPlan>, PlanFailure> {
    let Json(raw) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        PlanFailure::new(FailureKind::InvalidRequest, rejection.body_text())
    })?;

    let request = raw.validate().map_err(|e| {
        warn!("Rejected request: {}", e);
        PlanFailure::new(FailureKind::InvalidRequest, e.to_string())
    })?;

    info!(
        "Planning {} -> {} from {} for {} days",
        request.source(),
        request.destination(),
        request.start_date(),
        request.duration()
    );

    // Detached so a client disconnect cannot cancel an in-flight pipeline,
    // and a panic inside it surfaces here as a join error.
    let pipeline = tokio::spawn(async move { orchestrator.run(&request).await });
    match pipeline.await {
        Ok(result) => result.map(Json),
        Err(e) => {
            error!("Plan pipeline aborted: {}", e);
            Err(PlanFailure::internal())
        }
    }
}

async fn health(State(orchestrator): State<Arc<PlanOrchestrator>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: VERSION,
        model: orchestrator.model_name().to_string(),
        features: FEATURES.to_vec(),
    })
}
