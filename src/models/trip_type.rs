//! Recognised travel styles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    Solo,
    Couple,
    Family,
    Adventure,
    Cultural,
    Religious,
    Business,
    Luxury,
    Budget,
    Backpacking,
    Honeymoon,
    Educational,
    Wildlife,
    Beach,
    HillStation,
    Heritage,
    Spiritual,
    MedicalTourism,
}

impl TripType {
    pub const ALL: [TripType; 18] = [
        TripType::Solo,
        TripType::Couple,
        TripType::Family,
        TripType::Adventure,
        TripType::Cultural,
        TripType::Religious,
        TripType::Business,
        TripType::Luxury,
        TripType::Budget,
        TripType::Backpacking,
        TripType::Honeymoon,
        TripType::Educational,
        TripType::Wildlife,
        TripType::Beach,
        TripType::HillStation,
        TripType::Heritage,
        TripType::Spiritual,
        TripType::MedicalTourism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Solo => "solo",
            TripType::Couple => "couple",
            TripType::Family => "family",
            TripType::Adventure => "adventure",
            TripType::Cultural => "cultural",
            TripType::Religious => "religious",
            TripType::Business => "business",
            TripType::Luxury => "luxury",
            TripType::Budget => "budget",
            TripType::Backpacking => "backpacking",
            TripType::Honeymoon => "honeymoon",
            TripType::Educational => "educational",
            TripType::Wildlife => "wildlife",
            TripType::Beach => "beach",
            TripType::HillStation => "hill-station",
            TripType::Heritage => "heritage",
            TripType::Spiritual => "spiritual",
            TripType::MedicalTourism => "medical-tourism",
        }
    }

    /// Comma separated list used in prompts and error messages
    pub fn catalogue() -> String {
        Self::ALL
            .iter()
            .map(TripType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings outside the catalogue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a recognised trip type")]
pub struct UnknownTripType(pub String);

impl FromStr for TripType {
    type Err = UnknownTripType;

    /// Accepts any casing and `hill station` / `hill_station` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownTripType(s.to_string()))
    }
}
