//! Location verification for source and destination

use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{SemanticValidator, ValidationOutcome, non_empty, technical_failure};
use crate::llm::PromptPurpose;
use crate::prompts;

/// Which end of the trip a location stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationRole {
    Source,
    Destination,
}

impl LocationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationRole::Source => "source",
            LocationRole::Destination => "destination",
        }
    }

    fn purpose(&self) -> PromptPurpose {
        match self {
            LocationRole::Source => PromptPurpose::SourceLocation,
            LocationRole::Destination => PromptPurpose::DestinationLocation,
        }
    }
}

/// Verified Indian location with its current official spelling
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLocation {
    pub name: String,
    pub state: Option<String>,
    /// City, state, region or landmark as reported by the model
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationVerdict {
    is_valid: bool,
    #[serde(default)]
    is_indian: Option<bool>,
    #[serde(default)]
    corrected_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl SemanticValidator {
    /// Check that `location` is a real Indian place and canonicalise its name
    #[instrument(skip(self), fields(role = role.as_str()))]
    pub async fn validate_location(
        &self,
        location: &str,
        role: LocationRole,
    ) -> ValidationOutcome<CanonicalLocation> {
        let purpose = role.purpose();
        let verdict: LocationVerdict = match self
            .ask(
                purpose,
                prompts::LOCATION_SYSTEM.to_string(),
                prompts::location_user(location, role.as_str()),
                prompts::location_hint(),
            )
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => return technical_failure(purpose, &e),
        };

        let corrected = non_empty(verdict.corrected_name);
        let reason = non_empty(verdict.reason);

        if !verdict.is_valid || verdict.is_indian == Some(false) {
            let reason = reason.unwrap_or_else(|| {
                format!("'{location}' is not a recognised location in India")
            });
            warn!("Rejected {} '{}': {}", role.as_str(), location, reason);
            let suggestion = corrected.filter(|c| !c.eq_ignore_ascii_case(location));
            return ValidationOutcome::invalid(reason, suggestion);
        }

        let canonical = CanonicalLocation {
            name: corrected.unwrap_or_else(|| location.trim().to_string()),
            state: non_empty(verdict.state),
            kind: non_empty(verdict.kind),
        };
        info!(
            state = canonical.state.as_deref().unwrap_or("unknown"),
            kind = canonical.kind.as_deref().unwrap_or("unknown"),
            "Validated {} '{}' as '{}'",
            role.as_str(),
            location,
            canonical.name
        );

        ValidationOutcome::Valid(canonical)
    }
}
