//! Trip type check against the recognised catalogue

use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{SemanticValidator, ValidationOutcome, non_empty, technical_failure};
use crate::llm::PromptPurpose;
use crate::models::TripType;
use crate::prompts;

#[derive(Debug, Deserialize)]
struct TripTypeVerdict {
    is_valid: bool,
    #[serde(default)]
    suggested_type: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl SemanticValidator {
    /// Map free-form trip type text onto a [`TripType`].
    ///
    /// The model's suggestion wins when it names a catalogue entry; otherwise
    /// the input itself has to parse. A verdict that names nothing in the
    /// catalogue is rejected even when the model accepted it.
    #[instrument(skip(self))]
    pub async fn validate_trip_type(&self, trip_type: &str) -> ValidationOutcome<TripType> {
        let purpose = PromptPurpose::TripType;
        let verdict: TripTypeVerdict = match self
            .ask(
                purpose,
                prompts::trip_type_system(),
                prompts::trip_type_user(trip_type),
                prompts::trip_type_hint(),
            )
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => return technical_failure(purpose, &e),
        };

        let suggested = non_empty(verdict.suggested_type);
        let reason = non_empty(verdict.reason);

        if !verdict.is_valid {
            let reason =
                reason.unwrap_or_else(|| format!("'{trip_type}' is not a recognised trip type"));
            warn!("Rejected trip type '{}': {}", trip_type, reason);
            return ValidationOutcome::invalid(reason, suggested);
        }

        let resolved = suggested
            .as_deref()
            .and_then(|s| s.parse::<TripType>().ok())
            .or_else(|| trip_type.parse::<TripType>().ok());

        match resolved {
            Some(kind) => {
                info!("Trip type '{}' resolved to '{}'", trip_type, kind);
                ValidationOutcome::Valid(kind)
            }
            None => {
                warn!(
                    "Trip type '{}' accepted by model but not in catalogue (suggested {:?})",
                    trip_type, suggested
                );
                ValidationOutcome::invalid(
                    format!(
                        "'{trip_type}' is not a recognised trip type. Valid types: {}",
                        TripType::catalogue()
                    ),
                    None,
                )
            }
        }
    }
}
