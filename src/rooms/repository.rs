// src/rooms/repository.rs

//! Room store seam. All room reads go through this trait so the pipeline
//! can run against SQLite in production and in-memory fakes in tests.

use async_trait::async_trait;

use crate::config::CONFIG;
use crate::rooms::filter::StructuralFilter;
use crate::rooms::types::{RestaurantHit, RoomRecord};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Every visible room, up to the configured fetch limit.
    async fn list_all(&self) -> anyhow::Result<Vec<RoomRecord>>;

    /// Fetch specific rooms by id; unknown ids are silently absent.
    async fn fetch_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoomRecord>>;

    /// Ids of rooms passing the structural filter, capped at the candidate
    /// bound. Default implementation evaluates the filter in-process so
    /// every backend narrows identically.
    async fn list_by_structural_filter(
        &self,
        filter: &StructuralFilter,
    ) -> anyhow::Result<Vec<i64>> {
        let rooms = self.list_all().await?;
        let mut ids: Vec<i64> = rooms
            .iter()
            .filter(|room| filter.matches(room))
            .map(|room| room.id)
            .collect();
        ids.truncate(CONFIG.candidate_cap);
        Ok(ids)
    }

    /// Case-insensitive restaurant-name lookup; first hit wins. Queries
    /// shorter than two characters match nothing.
    async fn resolve_restaurant(&self, query: &str) -> anyhow::Result<Option<RestaurantHit>> {
        let query = query.trim().to_lowercase();
        if query.len() < 2 {
            return Ok(None);
        }
        let rooms = self.list_all().await?;
        Ok(rooms
            .iter()
            .find(|room| room.restaurant_name.to_lowercase().contains(&query))
            .map(|room| RestaurantHit {
                name: room.restaurant_name.clone(),
                address: room.address.clone(),
                lat: room.lat,
                lng: room.lng,
            }))
    }
}
