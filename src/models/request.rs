//! Inbound travel request and its syntactic constraints

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LOCATION_LEN: usize = 2;
pub const MAX_LOCATION_LEN: usize = 100;
pub const MAX_DURATION_DAYS: i64 = 365;
pub const MAX_TRAVELLERS_PER_GROUP: i64 = 50;
pub const MIN_BUDGET: f64 = 100.0;
pub const MAX_BUDGET: f64 = 10_000_000.0;

/// A request field that failed its constraint
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct RequestError {
    pub field: &'static str,
    pub message: String,
}

impl RequestError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Request as it arrives on the wire. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTravelRequest {
    pub source: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub duration: i64,
    pub adults: i64,
    pub children: i64,
    pub budget: f64,
    pub trip_type: String,
}

/// A syntactically valid travel request.
///
/// Only obtainable through [`RawTravelRequest::validate`]; never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelRequest {
    source: String,
    destination: String,
    start_date: NaiveDate,
    duration: u32,
    adults: u32,
    children: u32,
    budget: f64,
    trip_type: String,
}

impl RawTravelRequest {
    /// Check every field and build a [`TravelRequest`], failing on the first
    /// violated constraint.
    pub fn validate(self) -> Result<TravelRequest, RequestError> {
        let source = validate_location("source", &self.source)?;
        let destination = validate_location("destination", &self.destination)?;
        let start_date = validate_start_date(&self.start_date)?;
        let duration = validate_duration(self.duration)?;
        let adults = validate_travellers("adults", self.adults)?;
        let children = validate_travellers("children", self.children)?;
        let budget = validate_budget(self.budget)?;
        let trip_type = validate_trip_type(&self.trip_type)?;

        // the last travel day has to be representable
        if start_date
            .checked_add_days(Days::new(u64::from(duration) - 1))
            .is_none()
        {
            return Err(RequestError::new(
                "start_date",
                "Trip would end beyond the supported calendar range",
            ));
        }

        Ok(TravelRequest {
            source,
            destination,
            start_date,
            duration,
            adults,
            children,
            budget,
            trip_type,
        })
    }
}

impl TryFrom<RawTravelRequest> for TravelRequest {
    type Error = RequestError;

    fn try_from(raw: RawTravelRequest) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl TravelRequest {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the trip (`start_date + duration - 1`)
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.duration) - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn travellers(&self) -> u32 {
        self.adults + self.children
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Lower-cased, trimmed trip type as supplied by the caller
    pub fn trip_type(&self) -> &str {
        &self.trip_type
    }
}

/// Letters, spaces, hyphens, apostrophes and periods only
pub fn is_location_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.')
}

fn validate_location(field: &'static str, value: &str) -> Result<String, RequestError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if !(MIN_LOCATION_LEN..=MAX_LOCATION_LEN).contains(&len) {
        return Err(RequestError::new(
            field,
            format!(
                "Location must be between {MIN_LOCATION_LEN} and {MAX_LOCATION_LEN} characters"
            ),
        ));
    }
    if !trimmed.chars().all(is_location_char) {
        return Err(RequestError::new(
            field,
            "Location contains invalid characters",
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_start_date(value: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RequestError::new("start_date", "Start date must be in YYYY-MM-DD format"))
}

fn validate_duration(value: i64) -> Result<u32, RequestError> {
    if !(1..=MAX_DURATION_DAYS).contains(&value) {
        return Err(RequestError::new(
            "duration",
            format!("Duration must be between 1 and {MAX_DURATION_DAYS} days"),
        ));
    }
    u32::try_from(value).map_err(|_| RequestError::new("duration", "Duration is out of range"))
}

fn validate_travellers(field: &'static str, value: i64) -> Result<u32, RequestError> {
    if !(0..=MAX_TRAVELLERS_PER_GROUP).contains(&value) {
        return Err(RequestError::new(
            field,
            format!("Number of travelers must be between 0 and {MAX_TRAVELLERS_PER_GROUP}"),
        ));
    }
    u32::try_from(value).map_err(|_| RequestError::new(field, "Traveler count is out of range"))
}

fn validate_budget(value: f64) -> Result<f64, RequestError> {
    if !value.is_finite() || !(MIN_BUDGET..=MAX_BUDGET).contains(&value) {
        return Err(RequestError::new(
            "budget",
            "Budget must be between ₹100 and ₹10,000,000",
        ));
    }
    Ok(value)
}

fn validate_trip_type(value: &str) -> Result<String, RequestError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(RequestError::new(
            "trip_type",
            "Trip type must be a non-empty string",
        ));
    }
    Ok(normalized)
}
