//! Deterministic minimum-budget estimate for a trip shape
//!
//! The estimate only depends on duration and party size. Distance between
//! source and destination is not modelled; every trip is priced as a
//! medium-distance train journey with budget accommodation.

use tracing::{debug, warn};

use crate::TripwiseError;
use crate::models::{BudgetEstimate, CostBreakdown};

/// Per-day spend per traveller, in rupees
pub const DAILY_FOOD: f64 = 500.0;
pub const DAILY_ACTIVITIES: f64 = 300.0;
pub const DAILY_LOCAL_TRANSPORT: f64 = 200.0;
/// Children pay this share of an adult's room rate
pub const CHILD_ACCOMMODATION_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceTier {
    /// Same city or state
    Local,
    /// Different states
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Train,
    Bus,
    Flight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccommodationTier {
    /// Budget hotel or hostel
    Budget,
    /// 3-star hotel
    Standard,
    /// 5-star hotel
    Luxury,
}

impl DistanceTier {
    /// One-way fare per person
    pub fn one_way_fare(&self, mode: TransportMode) -> f64 {
        match (self, mode) {
            (DistanceTier::Local, TransportMode::Train) => 500.0,
            (DistanceTier::Local, TransportMode::Bus) => 300.0,
            (DistanceTier::Local, TransportMode::Flight) => 2000.0,
            (DistanceTier::Medium, TransportMode::Train) => 1500.0,
            (DistanceTier::Medium, TransportMode::Bus) => 800.0,
            (DistanceTier::Medium, TransportMode::Flight) => 4000.0,
            (DistanceTier::Long, TransportMode::Train) => 3000.0,
            (DistanceTier::Long, TransportMode::Bus) => 1500.0,
            (DistanceTier::Long, TransportMode::Flight) => 6000.0,
        }
    }

    pub fn round_trip_fare(&self, mode: TransportMode) -> f64 {
        self.one_way_fare(mode) * 2.0
    }
}

impl AccommodationTier {
    /// Nightly rate per adult
    pub fn nightly_rate(&self) -> f64 {
        match self {
            AccommodationTier::Budget => 800.0,
            AccommodationTier::Standard => 1500.0,
            AccommodationTier::Luxury => 5000.0,
        }
    }
}

/// Breakdown used when the formula cannot produce a usable number
pub const FALLBACK_BREAKDOWN: CostBreakdown = CostBreakdown {
    transportation: 2000.0,
    accommodation: 1500.0,
    food: 1000.0,
    activities: 300.0,
    local_transport: 200.0,
};

/// Estimate the minimum viable and recommended budget.
///
/// Never fails: if the computation does not yield finite amounts the fixed
/// [`FALLBACK_BREAKDOWN`] is returned instead.
pub fn estimate(duration: u32, adults: u32, children: u32) -> BudgetEstimate {
    match try_estimate(duration, adults, children) {
        Ok(estimate) => estimate,
        Err(e) => {
            warn!("Budget calculation failed, using fallback: {}", e);
            BudgetEstimate {
                cost_breakdown: FALLBACK_BREAKDOWN,
                reason: format!("Budget calculation failed: {e}"),
                is_fallback: true,
            }
        }
    }
}

/// Formula behind [`estimate`], surfacing failures instead of falling back
pub fn try_estimate(
    duration: u32,
    adults: u32,
    children: u32,
) -> Result<BudgetEstimate, TripwiseError> {
    let days = f64::from(duration);
    let adults = f64::from(adults);
    let children = f64::from(children);
    let travellers = adults + children;

    let room_rate = AccommodationTier::Budget.nightly_rate();
    let nightly_accommodation = room_rate * adults + room_rate * CHILD_ACCOMMODATION_SHARE * children;

    let cost_breakdown = CostBreakdown {
        transportation: DistanceTier::Medium.round_trip_fare(TransportMode::Train) * travellers,
        accommodation: nightly_accommodation * days,
        food: DAILY_FOOD * travellers * days,
        activities: DAILY_ACTIVITIES * travellers * days,
        local_transport: DAILY_LOCAL_TRANSPORT * travellers * days,
    };

    if !cost_breakdown.is_finite() {
        return Err(TripwiseError::general(
            "cost breakdown produced a non-finite amount",
        ));
    }

    let minimum = cost_breakdown.total();
    debug!(
        "Estimated minimum budget ₹{:.0} for {} travellers over {} days",
        minimum, travellers, days
    );

    Ok(BudgetEstimate {
        cost_breakdown,
        reason: format!("Minimum budget calculated: {}", format_inr(minimum)),
        is_fallback: false,
    })
}

/// Whole rupees with thousands separators, e.g. `₹37,400`
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_reference_trip() {
        // 5 days, 2 adults, 1 child
        let estimate = estimate(5, 2, 1);
        let costs = estimate.cost_breakdown;

        assert_eq!(costs.transportation, 9000.0);
        assert_eq!(costs.accommodation, 10000.0);
        assert_eq!(costs.food, 7500.0);
        assert_eq!(costs.activities, 4500.0);
        assert_eq!(costs.local_transport, 3000.0);
        assert_eq!(costs.subtotal(), 34000.0);
        assert!((costs.buffer() - 3400.0).abs() < 1e-9);
        assert!((estimate.minimum_required() - 37400.0).abs() < 1e-9);
        assert!((estimate.recommended_budget() - 44880.0).abs() < 1e-6);
        assert!(!estimate.is_fallback);
        assert_eq!(estimate.reason, "Minimum budget calculated: ₹37,400");
    }

    #[test]
    fn test_buffer_is_ten_percent() {
        for (d, a, c) in [(1, 1, 0), (7, 3, 2), (365, 50, 50), (12, 0, 4)] {
            let costs = estimate(d, a, c).cost_breakdown;
            assert!((costs.buffer() - costs.subtotal() * 0.10).abs() < 1e-6);
            assert!((costs.total() - (costs.subtotal() + costs.buffer())).abs() < 1e-6);
        }
    }

    #[rstest]
    #[case::duration(|n| (n, 2, 1))]
    #[case::adults(|n| (5, n, 1))]
    #[case::children(|n| (5, 2, n))]
    fn test_monotonic(#[case] shape: fn(u32) -> (u32, u32, u32)) {
        let mut previous = f64::MIN;
        for n in 1..=50 {
            let (d, a, c) = shape(n);
            let minimum = estimate(d, a, c).minimum_required();
            assert!(minimum >= previous, "not monotonic at {n}");
            previous = minimum;
        }
    }

    #[test]
    fn test_zero_travellers_costs_nothing() {
        let estimate = estimate(3, 0, 0);
        assert_eq!(estimate.minimum_required(), 0.0);
        assert!(!estimate.is_fallback);
    }

    #[test]
    fn test_fallback_breakdown_is_self_consistent() {
        assert!((FALLBACK_BREAKDOWN.total() - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_fare_tables() {
        assert_eq!(DistanceTier::Medium.round_trip_fare(TransportMode::Train), 3000.0);
        assert_eq!(DistanceTier::Long.one_way_fare(TransportMode::Flight), 6000.0);
        assert_eq!(AccommodationTier::Luxury.nightly_rate(), 5000.0);
    }

    #[rstest]
    #[case(0.0, "₹0")]
    #[case(999.4, "₹999")]
    #[case(1000.0, "₹1,000")]
    #[case(37400.0, "₹37,400")]
    #[case(10_000_000.0, "₹10,000,000")]
    #[case(-2500.0, "-₹2,500")]
    fn test_format_inr(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_inr(amount), expected);
    }
}
