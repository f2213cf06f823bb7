// src/requirements/mod.rs

//! The running requirements snapshot for an event and the merge logic that
//! folds each conversational turn into it.
//!
//! Every slot is optional; a blank-after-trim string means "unset", never
//! the literal value. Merging is a monotonic union: incoming unset/blank
//! slots never clear what the user already told us.

pub mod schema;

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;
use schema::{opt_bool, opt_string};

/// Fields the intake flow must collect before ranking is worth running.
pub const REQUIRED_FIELDS: &[&str] = &[
    "areaLabel",
    "headcount",
    "budgetTotal",
    "dateNeeded",
    "timeNeeded",
];

const ALL_FIELDS: &[&str] = &[
    "areaLabel",
    "radiusMiles",
    "headcount",
    "budgetTotal",
    "budgetPerHead",
    "needsAV",
    "eventType",
    "dateNeeded",
    "timeNeeded",
    "privacyLevel",
    "noiseLevel",
    "vibe",
    "restaurantQuery",
    "maxCakeFee",
    "maxCorkageFee",
];

/// User-stated constraints for an event. All text slots are stored as
/// strings exactly as extracted; typed accessors parse them leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Requirements {
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub area_label: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub headcount: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub budget_total: Option<String>,
    /// Per-head budget reported by the extractor before headcount is known.
    /// Converted into `budget_total` by `merge` once both are present.
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub budget_per_head: Option<String>,
    #[serde(
        rename = "needsAV",
        deserialize_with = "opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub needs_av: Option<bool>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub date_needed: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub time_needed: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub restaurant_query: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub max_cake_fee: Option<String>,
    #[serde(deserialize_with = "opt_string", skip_serializing_if = "Option::is_none")]
    pub max_corkage_fee: Option<String>,
}

impl Requirements {
    /// Validate and coerce an untrusted JSON value into a snapshot.
    /// Unknown fields are rejected; values get the same lenient coercion
    /// the extractor boundary applies (numbers/bools stringified, blank
    /// strings dropped).
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecommendError> {
        serde_json::from_value(value)
            .map_err(|e| RecommendError::InvalidRequirements(e.to_string()))
    }

    pub fn headcount(&self) -> Option<i64> {
        parse_number(self.headcount.as_deref()?).map(|n| n as i64).filter(|n| *n > 0)
    }

    pub fn budget_total(&self) -> Option<f64> {
        parse_number(self.budget_total.as_deref()?).filter(|n| *n > 0.0)
    }

    pub fn budget_per_head(&self) -> Option<f64> {
        parse_number(self.budget_per_head.as_deref()?).filter(|n| *n > 0.0)
    }

    pub fn radius_miles(&self) -> Option<f64> {
        parse_number(self.radius_miles.as_deref()?).filter(|n| *n > 0.0)
    }

    /// Whether a named slot holds a non-blank value.
    pub fn is_set(&self, field: &str) -> bool {
        match field {
            "needsAV" => self.needs_av.is_some(),
            _ => self
                .text_slot(field)
                .is_some_and(|v| !v.trim().is_empty()),
        }
    }

    fn text_slot(&self, field: &str) -> Option<&str> {
        let slot = match field {
            "areaLabel" => &self.area_label,
            "radiusMiles" => &self.radius_miles,
            "headcount" => &self.headcount,
            "budgetTotal" => &self.budget_total,
            "budgetPerHead" => &self.budget_per_head,
            "eventType" => &self.event_type,
            "dateNeeded" => &self.date_needed,
            "timeNeeded" => &self.time_needed,
            "privacyLevel" => &self.privacy_level,
            "noiseLevel" => &self.noise_level,
            "vibe" => &self.vibe,
            "restaurantQuery" => &self.restaurant_query,
            "maxCakeFee" => &self.max_cake_fee,
            "maxCorkageFee" => &self.max_corkage_fee,
            _ => return None,
        };
        slot.as_deref()
    }

    fn field_view(&self, field: &str) -> Option<String> {
        if field == "needsAV" {
            return self.needs_av.map(|b| b.to_string());
        }
        self.text_slot(field).map(|s| s.to_string())
    }
}

/// Fold `incoming` into `current`, returning a new snapshot. Unset or
/// blank incoming slots never overwrite; non-blank incoming always wins.
pub fn merge(current: &Requirements, incoming: &Requirements) -> Requirements {
    let mut next = current.clone();
    fold(&mut next.area_label, &incoming.area_label);
    fold(&mut next.radius_miles, &incoming.radius_miles);
    fold(&mut next.headcount, &incoming.headcount);
    fold(&mut next.budget_total, &incoming.budget_total);
    fold(&mut next.budget_per_head, &incoming.budget_per_head);
    if incoming.needs_av.is_some() {
        next.needs_av = incoming.needs_av;
    }
    fold(&mut next.event_type, &incoming.event_type);
    fold(&mut next.date_needed, &incoming.date_needed);
    fold(&mut next.time_needed, &incoming.time_needed);
    fold(&mut next.privacy_level, &incoming.privacy_level);
    fold(&mut next.noise_level, &incoming.noise_level);
    fold(&mut next.vibe, &incoming.vibe);
    fold(&mut next.restaurant_query, &incoming.restaurant_query);
    fold(&mut next.max_cake_fee, &incoming.max_cake_fee);
    fold(&mut next.max_corkage_fee, &incoming.max_corkage_fee);

    // A per-head figure stays pending until headcount is known, then it is
    // promoted to a total. An explicitly stated total always wins.
    if next.budget_total().is_none() {
        if let (Some(per_head), Some(heads)) = (next.budget_per_head(), next.headcount()) {
            next.budget_total = Some(format!("{}", per_head * heads as f64));
        }
    }

    next
}

fn fold(dst: &mut Option<String>, src: &Option<String>) {
    if let Some(value) = src {
        if !value.trim().is_empty() {
            *dst = Some(value.clone());
        }
    }
}

/// Required fields still absent or blank, in declaration order. Drives the
/// single clarifying follow-up and gates whether ranking runs at all.
pub fn missing_required<'a>(reqs: &Requirements, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| !reqs.is_set(field))
        .collect()
}

/// Pure diff between two snapshots, for callers that highlight what a turn
/// changed. Field names use the external (camelCase) spelling.
pub fn changed_fields(old: &Requirements, new: &Requirements) -> Vec<&'static str> {
    ALL_FIELDS
        .iter()
        .copied()
        .filter(|field| old.field_view(field) != new.field_view(field))
        .collect()
}

/// Lenient numeric parse: keeps digits, sign and decimal point so inputs
/// like "$4,500" or "12 people" still yield a number.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok().filter(|n: &f64| n.is_finite())
}
