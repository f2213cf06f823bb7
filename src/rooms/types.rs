// src/rooms/types.rs

use serde::{Deserialize, Serialize};

/// One bookable private-dining space within a restaurant. Immutable from
/// the pipeline's perspective; owned by the external data store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomRecord {
    pub id: i64,
    pub restaurant_name: String,
    pub room_name: String,
    pub address: Option<String>,
    pub event_type: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub seated_capacity: Option<i64>,
    pub standing_capacity: Option<i64>,
    pub privacy_level: Option<String>,
    pub noise_level: Option<String>,
    pub primary_vibe: Option<String>,
    pub vibe_tags: Option<String>,
    pub a_v: Option<String>,
    pub min_spend_estimate: Option<f64>,
    pub contact_email: Option<String>,
    pub room_photo_link: Option<String>,
    pub notes: Option<String>,
}

impl RoomRecord {
    /// Whether the room carries any free-text notes worth retrieving.
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// A geographic query point resolved by the caller (geocoding is external).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// First match for a restaurant-name lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantHit {
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
