// src/aggregate.rs

//! Rolls per-room scores up into a restaurant-level shortlist: group by
//! restaurant, keep each restaurant's best room, order by that score, then
//! partition into an eligible "top" bucket (radius/city gated, with a
//! guaranteed-non-empty fallback) and an "others" bucket.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::requirements::Requirements;
use crate::retrieval::RetrievedNote;
use crate::scoring::ScoredRoom;
use crate::utils::{city_initials, city_token, normalize_token, CityToken};

const TOP_LIMIT: usize = 3;
const OTHERS_LIMIT: usize = 12;
const OUTSIDE_RADIUS_TAG: &str = " (outside radius)";

/// All scored rooms for one restaurant. `best_room` is always a member of
/// `all_rooms`; first-seen wins exact score ties.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantGroup {
    pub restaurant_name: String,
    pub best_room: ScoredRoom,
    pub all_rooms: Vec<ScoredRoom>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingResult {
    pub top: Vec<RestaurantGroup>,
    pub others: Vec<RestaurantGroup>,
    pub total_restaurants: usize,
    pub total_rooms: usize,
    /// Semantically retrieved notes for the turn's free-text query, if any.
    pub notes: Vec<RetrievedNote>,
}

pub fn aggregate(scored: Vec<ScoredRoom>, reqs: &Requirements) -> RankingResult {
    let total_rooms = scored.len();
    let radius = reqs.radius_miles();
    let city = reqs.area_label.as_deref().and_then(city_token);

    // Stable sort keeps original input order for equal scores.
    let mut ordered = scored;
    ordered.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut groups: Vec<RestaurantGroup> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    for room in ordered {
        let name = room.room.restaurant_name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        match index_by_name.get(&name) {
            Some(&i) => {
                let group = &mut groups[i];
                // strictly greater: first-seen keeps ties
                if room.score > group.best_room.score {
                    group.best_room = room.clone();
                }
                group.all_rooms.push(room);
            }
            None => {
                index_by_name.insert(name.clone(), groups.len());
                groups.push(RestaurantGroup {
                    restaurant_name: name,
                    best_room: room.clone(),
                    all_rooms: vec![room],
                });
            }
        }
    }

    groups.sort_by(|a, b| {
        b.best_room
            .score
            .partial_cmp(&a.best_room.score)
            .unwrap_or(Ordering::Equal)
    });

    // Without a stated radius the "(outside radius)" annotation is a
    // scoring-internal artifact; scrub it before exposing reasons.
    if radius.is_none() {
        for group in &mut groups {
            for room in &mut group.all_rooms {
                scrub_radius_tag(room);
            }
            scrub_radius_tag(&mut group.best_room);
        }
    }

    let eligible: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, group)| is_eligible(group, radius, city.as_ref()))
        .map(|(i, _)| i)
        .collect();

    // Never return an empty top bucket while candidates exist.
    let top_indices: Vec<usize> = if eligible.is_empty() && !groups.is_empty() {
        (0..groups.len().min(TOP_LIMIT)).collect()
    } else {
        eligible.into_iter().take(TOP_LIMIT).collect()
    };
    let top_set: HashSet<usize> = top_indices.iter().copied().collect();

    let total_restaurants = groups.len();
    let mut top = Vec::with_capacity(top_set.len());
    let mut others = Vec::new();
    for (i, group) in groups.into_iter().enumerate() {
        if top_set.contains(&i) {
            top.push(group);
        } else if others.len() < OTHERS_LIMIT {
            others.push(group);
        }
    }

    RankingResult {
        top,
        others,
        total_restaurants,
        total_rooms,
        notes: Vec::new(),
    }
}

fn is_eligible(group: &RestaurantGroup, radius: Option<f64>, city: Option<&CityToken>) -> bool {
    if let Some(radius) = radius {
        return group
            .best_room
            .distance_miles
            .is_some_and(|d| d <= radius);
    }
    if let Some(city) = city {
        return matches_city(group.best_room.room.address.as_deref(), city);
    }
    true
}

fn matches_city(address: Option<&str>, city: &CityToken) -> bool {
    let Some(address) = address else {
        return false;
    };
    let normalized = normalize_token(address);
    if normalized.contains(&city.normalized) {
        return true;
    }
    // Abbreviation fallback: "san francisco" also matches addresses that
    // spell the city as "sf".
    if let Some(initials) = city_initials(&city.normalized) {
        if normalized.split_whitespace().any(|word| word == initials) {
            return true;
        }
    }
    false
}

fn scrub_radius_tag(room: &mut ScoredRoom) {
    for reason in &mut room.reasons {
        if let Some(stripped) = reason.strip_suffix(OUTSIDE_RADIUS_TAG) {
            *reason = stripped.to_string();
        }
    }
}
