//! Semantic validators
//!
//! Each check hands one candidate value to the generative capability and
//! turns the verdict into a [`ValidationOutcome`]. Capability failures never
//! escape: a timeout, a transport error or an unreadable verdict all become
//! `Invalid` with a technical reason, so an unreachable capability rejects the
//! request instead of skipping the check.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm::{CapabilityError, GenerativeCapability, PromptPurpose, PromptSpec};

pub mod dates;
pub mod location;
pub mod trip_type;

pub use dates::TravelWindow;
pub use location::{CanonicalLocation, LocationRole};

/// Result of one semantic check
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome<T> {
    /// Accepted, carrying the corrected value and any metadata
    Valid(T),
    Invalid {
        reason: String,
        suggestion: Option<String>,
    },
}

impl<T> ValidationOutcome<T> {
    pub fn invalid(reason: impl Into<String>, suggestion: Option<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
            suggestion,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Runs the three semantic checks against one capability.
#[derive(Clone)]
pub struct SemanticValidator {
    capability: Arc<dyn GenerativeCapability>,
    timeout: Duration,
    temperature: f64,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum VerdictError {
    #[error("{0}")]
    Capability(#[from] CapabilityError),
    #[error("unexpected verdict shape: {0}")]
    Shape(String),
}

impl SemanticValidator {
    pub fn new(
        capability: Arc<dyn GenerativeCapability>,
        timeout: Duration,
        temperature: f64,
    ) -> Self {
        Self {
            capability,
            timeout,
            temperature,
        }
    }

    /// Ask the capability and decode its verdict into `V`.
    ///
    /// The timeout is enforced here as well as by the capability, so a
    /// misbehaving implementation cannot stall the pipeline.
    pub(crate) async fn ask<V: DeserializeOwned>(
        &self,
        purpose: PromptPurpose,
        system_instruction: String,
        user_instruction: String,
        response_schema_hint: Value,
    ) -> Result<V, VerdictError> {
        let spec = PromptSpec {
            purpose,
            system_instruction,
            user_instruction,
            response_schema_hint,
            temperature: self.temperature,
            timeout: self.timeout,
        };

        let answer: Map<String, Value> =
            match tokio::time::timeout(self.timeout, self.capability.generate(&spec)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(CapabilityError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                    .into());
                }
            };

        debug!(%purpose, "Verdict received: {:?}", answer);
        serde_json::from_value(Value::Object(answer)).map_err(|e| VerdictError::Shape(e.to_string()))
    }
}

/// Client-facing reason for a check that could not complete
pub const TECHNICAL_FAILURE_REASON: &str = "Validation failed due to technical error";

/// Convert a failed check into the uniform technical rejection.
///
/// The underlying error is logged only; provider bodies never reach callers.
pub(crate) fn technical_failure<T>(purpose: PromptPurpose, err: &VerdictError) -> ValidationOutcome<T> {
    warn!(%purpose, "Semantic validation could not complete: {}", err);
    ValidationOutcome::invalid(TECHNICAL_FAILURE_REASON, None)
}

/// Trimmed, non-empty string or `None`
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
