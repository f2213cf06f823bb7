// src/rooms/filter.rs

//! Structural candidate narrowing: only predicates knowable without
//! embeddings. Filtering is conjunctive over the fields that are actually
//! set; an empty result is a valid outcome, not an error.

use crate::requirements::Requirements;
use crate::rooms::types::RoomRecord;
use crate::utils::{has_av_indicator, normalize_token};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralFilter {
    /// Normalized city token that must appear in the normalized address.
    pub city_token: Option<String>,
    /// Capacity floor: `seated_capacity >= headcount`.
    pub min_capacity: Option<i64>,
    /// Spend ceiling: `min_spend_estimate <= budget_total`.
    pub max_spend: Option<f64>,
    pub privacy_level: Option<String>,
    pub noise_level: Option<String>,
    pub event_type: Option<String>,
    /// Require a positive A/V indicator token.
    pub needs_av: bool,
}

impl StructuralFilter {
    pub fn from_requirements(reqs: &Requirements) -> Self {
        Self {
            city_token: reqs
                .area_label
                .as_deref()
                .and_then(crate::utils::city_token)
                .map(|t| t.normalized),
            min_capacity: reqs.headcount(),
            max_spend: reqs.budget_total(),
            privacy_level: reqs.privacy_level.as_deref().map(str::to_lowercase),
            noise_level: reqs.noise_level.as_deref().map(str::to_lowercase),
            event_type: reqs.event_type.as_deref().map(str::to_lowercase),
            needs_av: reqs.needs_av == Some(true),
        }
    }

    /// Conjunction over the set predicates only. Unset fields contribute
    /// nothing, so an empty filter matches every room.
    pub fn matches(&self, room: &RoomRecord) -> bool {
        if let Some(city) = &self.city_token {
            let Some(address) = room.address.as_deref() else {
                return false;
            };
            if !normalize_token(address).contains(city.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_capacity {
            if room.seated_capacity.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(max) = self.max_spend {
            let Some(spend) = room.min_spend_estimate else {
                return false;
            };
            if spend > max {
                return false;
            }
        }
        if let Some(privacy) = &self.privacy_level {
            if !contains_ci(room.privacy_level.as_deref(), privacy) {
                return false;
            }
        }
        if let Some(noise) = &self.noise_level {
            if !contains_ci(room.noise_level.as_deref(), noise) {
                return false;
            }
        }
        if let Some(event) = &self.event_type {
            if !contains_ci(room.event_type.as_deref(), event) {
                return false;
            }
        }
        if self.needs_av {
            let Some(av) = room.a_v.as_deref() else {
                return false;
            };
            if !has_av_indicator(av) {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room() -> RoomRecord {
        RoomRecord {
            id: 1,
            restaurant_name: "Carmen's".to_string(),
            room_name: "Wine Cellar".to_string(),
            address: Some("500 Valencia St, San Francisco, CA".to_string()),
            event_type: Some("Dinner, corporate".to_string()),
            seated_capacity: Some(20),
            privacy_level: Some("Fully private".to_string()),
            noise_level: Some("Quiet".to_string()),
            a_v: Some("Yes, projector".to_string()),
            min_spend_estimate: Some(2000.0),
            ..Default::default()
        }
    }

    fn filter_for(value: serde_json::Value) -> StructuralFilter {
        let reqs = crate::requirements::Requirements::from_value(value).unwrap();
        StructuralFilter::from_requirements(&reqs)
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(StructuralFilter::default().matches(&room()));
    }

    #[test]
    fn unset_fields_contribute_no_predicate() {
        let filter = filter_for(json!({ "headcount": "12" }));
        assert!(filter.city_token.is_none());
        assert!(filter.max_spend.is_none());
        assert!(filter.matches(&room()));
    }

    #[test]
    fn city_token_must_appear_in_address() {
        let filter = filter_for(json!({ "areaLabel": "San Francisco, CA" }));
        assert!(filter.matches(&room()));

        let elsewhere = filter_for(json!({ "areaLabel": "Oakland, CA" }));
        assert!(!elsewhere.matches(&room()));

        let mut no_address = room();
        no_address.address = None;
        assert!(!filter.matches(&no_address));
    }

    #[test]
    fn capacity_floor_and_spend_ceiling() {
        let filter = filter_for(json!({ "headcount": "25", "budgetTotal": "5000" }));
        assert!(!filter.matches(&room())); // seats 20 < 25

        let filter = filter_for(json!({ "headcount": "18", "budgetTotal": "1500" }));
        assert!(!filter.matches(&room())); // spend 2000 > 1500

        let filter = filter_for(json!({ "headcount": "18", "budgetTotal": "2500" }));
        assert!(filter.matches(&room()));
    }

    #[test]
    fn av_requires_positive_indicator() {
        let filter = filter_for(json!({ "needsAV": true }));
        assert!(filter.matches(&room()));

        let mut no_av = room();
        no_av.a_v = Some("None".to_string());
        assert!(!filter.matches(&no_av));
        no_av.a_v = None;
        assert!(!filter.matches(&no_av));
    }

    #[test]
    fn substring_predicates_are_case_insensitive() {
        let filter = filter_for(json!({
            "privacyLevel": "private",
            "noiseLevel": "quiet",
            "eventType": "corporate"
        }));
        assert!(filter.matches(&room()));

        let loud = filter_for(json!({ "noiseLevel": "lively" }));
        assert!(!loud.matches(&room()));
    }
}
