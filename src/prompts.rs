//! Instruction text and response shapes sent to the generative capability

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::budget::format_inr;
use crate::models::TripType;
use crate::orchestrator::PlanBrief;

pub const LOCATION_SYSTEM: &str = "You are an expert in Indian geography and travel. \
Analyze the given location and decide whether it is a real place in India.

Rules:
1. Only Indian locations are valid
2. Check spelling accuracy
3. Reject gibberish, fictional places and foreign locations
4. Accept cities, states, regions, landmarks and tourist destinations
5. Provide the corrected, current official spelling in corrected_name \
(for example Bombay -> Mumbai, Calcutta -> Kolkata, Madras -> Chennai)";

pub fn location_user(location: &str, role: &str) -> String {
    format!(
        "Validate this {role}: '{location}'. Is it a valid Indian location with correct spelling?"
    )
}

pub fn location_hint() -> Value {
    json!({
        "is_valid": true,
        "is_indian": true,
        "corrected_name": "correct spelling if needed",
        "state": "state name if valid",
        "type": "city/state/region/landmark",
        "reason": "explanation for validation result"
    })
}

pub fn trip_type_system() -> String {
    format!(
        "You are a travel expert. Validate the trip type for Indian travel planning. \
If it is close to a recognised type, answer with that type in suggested_type.\n\n\
Valid types: {}",
        TripType::catalogue()
    )
}

pub fn trip_type_user(trip_type: &str) -> String {
    format!("Is '{trip_type}' a valid trip type for Indian travel planning?")
}

pub fn trip_type_hint() -> Value {
    json!({
        "is_valid": true,
        "suggested_type": "one of the valid types",
        "reason": "explanation"
    })
}

pub const DATE_SYSTEM: &str = "You are a travel date validation expert for India. \
Decide whether the travel period is sensible. Flag start dates that are already in the past. \
Describe the season and weather for the period and any major festivals that overlap it.";

pub fn date_user(start: NaiveDate, duration: u32, end: NaiveDate, today: NaiveDate) -> String {
    format!(
        "Start date: {start}, Duration: {duration} days, End date: {end}, Today: {today}. \
Is this a valid travel period?"
    )
}

pub fn date_hint() -> Value {
    json!({
        "is_valid": true,
        "reason": "explanation",
        "suggested_start_date": "YYYY-MM-DD if needed",
        "season_info": "season and weather info",
        "festival_info": "any major festivals during this period"
    })
}

pub const PLAN_SYSTEM: &str = "You are an expert Indian travel planner. Generate detailed, \
realistic travel plans with accurate pricing and complete information. Output valid JSON ONLY.";

/// Plan structure the model has to fill in, pre-populated with the trip facts
pub fn plan_skeleton(brief: &PlanBrief) -> Value {
    json!({
        "trip_summary": {
            "source": brief.source,
            "destination": brief.destination,
            "start_date": brief.start_date.to_string(),
            "end_date": brief.end_date.to_string(),
            "duration": brief.duration,
            "travelers": {
                "adults": brief.adults,
                "children": brief.children,
                "total": brief.adults + brief.children
            },
            "trip_type": brief.trip_type.as_str(),
            "budget": brief.budget,
            "season": brief.season_info,
            "festivals": brief.festival_info
        },
        "transportation": {
            "outbound": transport_leg_hint(),
            "return": transport_leg_hint(),
            "local_transport": {
                "mode": "metro/bus/taxi/auto",
                "daily_cost": 0,
                "total_cost": 0
            }
        },
        "accommodation": [{
            "name": "Hotel Name",
            "type": "hotel/hostel/guesthouse",
            "rating": "X stars",
            "location": "area name",
            "cost_per_night": 0,
            "total_cost": 0,
            "amenities": ["wifi", "ac", "food"],
            "booking_link": "https://..."
        }],
        "itinerary": [{
            "day": 1,
            "date": brief.start_date.to_string(),
            "activities": [{
                "time": "HH:MM",
                "activity": "description",
                "location": "place name",
                "cost": 0,
                "duration": "X hours"
            }],
            "meals": {
                "breakfast": "...",
                "lunch": "...",
                "dinner": "..."
            },
            "total_day_cost": 0
        }],
        "budget_breakdown": {
            "transportation": 0,
            "accommodation": 0,
            "food": 0,
            "activities": 0,
            "buffer": 0,
            "total_estimated": 0
        },
        "recommendations": {
            "packing_list": ["item1", "item2"],
            "travel_tips": ["tip1", "tip2"],
            "emergency_contacts": ["contact1", "contact2"],
            "weather_advice": "weather info",
            "local_customs": "cultural advice"
        }
    })
}

fn transport_leg_hint() -> Value {
    json!({
        "mode": "train/flight/bus",
        "details": "...",
        "duration": "X hours",
        "cost_per_person": 0,
        "total_cost": 0,
        "booking_link": "https://...",
        "departure_time": "HH:MM",
        "arrival_time": "HH:MM"
    })
}

pub fn plan_user(brief: &PlanBrief) -> String {
    let travellers = brief.adults + brief.children;
    let budget = format_inr(brief.budget);
    format!(
        "Create a detailed JSON travel plan for a round trip from {source} to {destination}, \
{start} to {end} ({duration} days), for {adults} adults and {children} children, \
trip type {trip_type}, total budget {budget}.

CRITICAL REQUIREMENTS:
1. Stay within the {budget} budget. Prefer trains; use flights only when the budget is very high
2. ALL costs must be realistic current Indian prices in rupees
3. budget_breakdown.buffer must be exactly 10% of (transportation + accommodation + food + activities)
4. budget_breakdown.total_estimated must equal the sum of all categories including the buffer
5. The itinerary must contain exactly {duration} entries, one per day, day 1 dated {start}
6. Include the return journey to {source}
7. Verify that every transportation option actually exists
8. Include realistic daily activities and meals suited to a {trip_type} trip
9. Account for {travellers} travelers
10. Consider the season and festivals: {season}; {festivals}
11. Use the budget to plan accordingly: better stays and activities when it is high, \
budget-friendly options when it is low
12. Keep trip_summary exactly as given",
        source = brief.source,
        destination = brief.destination,
        start = brief.start_date,
        end = brief.end_date,
        duration = brief.duration,
        adults = brief.adults,
        children = brief.children,
        trip_type = brief.trip_type,
        season = brief.season_info,
        festivals = brief.festival_info,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> PlanBrief {
        PlanBrief {
            source: "Mumbai".to_string(),
            destination: "Delhi".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 29).unwrap(),
            duration: 5,
            adults: 2,
            children: 1,
            budget: 50_000.0,
            trip_type: TripType::Family,
            season_info: "Winter, cold and foggy".to_string(),
            festival_info: "Christmas, New Year".to_string(),
        }
    }

    #[test]
    fn test_skeleton_carries_trip_facts() {
        let skeleton = plan_skeleton(&brief());
        let summary = &skeleton["trip_summary"];
        assert_eq!(summary["source"], "Mumbai");
        assert_eq!(summary["end_date"], "2024-12-29");
        assert_eq!(summary["travelers"]["total"], 3);
        assert_eq!(summary["trip_type"], "family");
        assert_eq!(skeleton["itinerary"][0]["date"], "2024-12-25");
    }

    #[test]
    fn test_plan_user_mentions_constraints() {
        let text = plan_user(&brief());
        assert!(text.contains("from Mumbai to Delhi"));
        assert!(text.contains("exactly 5 entries"));
        assert!(text.contains("₹50,000"));
        assert!(text.contains("Christmas, New Year"));
    }

    #[test]
    fn test_trip_type_system_lists_catalogue() {
        assert!(trip_type_system().contains("hill-station"));
    }

    #[test]
    fn test_date_user() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(
            date_user(start, 3, end, today),
            "Start date: 2025-03-01, Duration: 3 days, End date: 2025-03-03, Today: 2025-02-01. \
Is this a valid travel period?"
        );
    }
}
