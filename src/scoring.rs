// src/scoring.rs

//! The central ranking function. Deterministic, no I/O: every rule applies
//! independently and adds to the score, and appends a human-readable reason
//! when it fires. Scores are unbounded and only meaningful relative to each
//! other within one ranking pass.

use serde::Serialize;

use crate::requirements::Requirements;
use crate::rooms::types::{GeoPoint, RoomRecord};
use crate::utils::{city_token, has_av_indicator, normalize_token};

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A room plus its desirability for one set of requirements. Reasons are
/// ordered by rule-firing order; the UI shows them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRoom {
    pub room: RoomRecord,
    pub score: f64,
    pub reasons: Vec<String>,
    pub distance_miles: Option<f64>,
    pub within_radius: Option<bool>,
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Score one room against the requirements. `origin` is the caller-resolved
/// query point; without it (or without room coordinates) the distance rule
/// simply never fires.
pub fn score_room(room: &RoomRecord, reqs: &Requirements, origin: Option<GeoPoint>) -> ScoredRoom {
    let mut priority = 0.0_f64;
    let mut secondary = 0.0_f64;
    let mut reasons: Vec<String> = Vec::new();
    let mut distance_miles: Option<f64> = None;
    let mut within_radius: Option<bool> = None;

    let city = reqs.area_label.as_deref().and_then(city_token);

    // distance
    if let (Some(origin), Some(lat), Some(lng)) = (origin, room.lat, room.lng) {
        let d = haversine_miles(origin, GeoPoint { lat, lng });
        distance_miles = Some(d);
        match reqs.radius_miles() {
            Some(radius) => {
                if d <= radius {
                    within_radius = Some(true);
                    priority += (60.0 - d * 5.0).max(0.0);
                    reasons.push(format!("{d:.1} miles away"));
                } else {
                    within_radius = Some(false);
                    priority -= 80.0;
                    reasons.push(format!("{d:.1} miles away (outside radius)"));
                }
            }
            None => {
                // No radius: distance alone never disqualifies, it only
                // nudges the ordering toward closer rooms.
                within_radius = Some(true);
                priority += (30.0 - d * 2.0).max(0.0);
                reasons.push(format!("{d:.1} miles away"));
            }
        }
    }

    // area-label text match (reinforces or stands in for precise geo)
    if let (Some(city), Some(address)) = (&city, room.address.as_deref()) {
        if normalize_token(address).contains(&city.normalized) {
            priority += 30.0;
            reasons.push(format!("Address match: {}", city.raw));
        } else {
            priority -= 20.0;
        }
    }

    // capacity
    if let (Some(headcount), Some(capacity)) = (reqs.headcount(), room.seated_capacity) {
        if capacity > 0 {
            let surplus = capacity - headcount;
            if surplus >= 0 {
                let closeness = (40.0 - surplus as f64 * 3.0).max(0.0);
                priority += 40.0 + closeness;
                if surplus == 0 {
                    reasons.push(format!("Seated cap {capacity} (exact fit)"));
                } else {
                    reasons.push(format!("Seated cap {capacity}"));
                }
            } else {
                priority -= 90.0 + surplus.abs() as f64 * 4.0;
                reasons.push(format!("Too small for {headcount}"));
            }
        }
    }

    // privacy/noise/vibe
    if let (Some(want), Some(have)) = (reqs.privacy_level.as_deref(), room.privacy_level.as_deref())
    {
        if have.to_lowercase().contains(&want.to_lowercase()) {
            secondary += 6.0;
            reasons.push(format!("Privacy: {have}"));
        }
    }
    if let (Some(want), Some(have)) = (reqs.noise_level.as_deref(), room.noise_level.as_deref()) {
        if have.to_lowercase().contains(&want.to_lowercase()) {
            secondary += 5.0;
            reasons.push(format!("Noise: {have}"));
        }
    }
    if let Some(vibe) = reqs.vibe.as_deref() {
        let haystack = format!(
            "{} {}",
            room.primary_vibe.as_deref().unwrap_or(""),
            room.vibe_tags.as_deref().unwrap_or("")
        )
        .to_lowercase();
        if haystack.contains(&vibe.to_lowercase()) {
            secondary += 6.0;
            reasons.push(format!("Vibe match: {vibe}"));
        }
    }

    // A/V
    if reqs.needs_av == Some(true) {
        if has_av_indicator(room.a_v.as_deref().unwrap_or("")) {
            secondary += 15.0;
            reasons.push("A/V available".to_string());
        } else {
            secondary -= 10.0;
            reasons.push("A/V unknown".to_string());
        }
    }

    // budget (rough)
    match (reqs.budget_total(), room.min_spend_estimate) {
        (Some(budget), Some(spend)) if spend > 0.0 => {
            if spend <= budget {
                priority += 35.0;
                reasons.push(format!("Min spend ~${spend}"));
            } else {
                priority -= 40.0;
                reasons.push("Min spend may exceed budget".to_string());
            }
        }
        (None, Some(spend)) if spend > 0.0 => {
            // No budget yet; surface the figure without moving the score.
            reasons.push(format!("Min spend ~${spend}"));
        }
        _ => {}
    }

    ScoredRoom {
        room: room.clone(),
        score: priority + secondary,
        reasons,
        distance_miles,
        within_radius,
    }
}
