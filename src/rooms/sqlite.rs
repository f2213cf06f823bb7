// src/rooms/sqlite.rs

//! SQLite-backed room store. The `restaurant_rooms` table is owned by the
//! external data layer; this adapter only reads it.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::config::CONFIG;
use crate::rooms::repository::RoomRepository;
use crate::rooms::types::{RestaurantHit, RoomRecord};

const ROOM_COLUMNS: &str = "id, restaurant_name, room_name, address, event_type, lat, lng, \
     seated_capacity, standing_capacity, privacy_level, noise_level, primary_vibe, vibe_tags, \
     a_v, min_spend_estimate, contact_email, room_photo_link, notes";

pub struct SqliteRoomStore {
    pub pool: SqlitePool,
}

impl SqliteRoomStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(CONFIG.sqlite_max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomStore {
    async fn list_all(&self) -> Result<Vec<RoomRecord>> {
        let sql = format!(
            "SELECT {ROOM_COLUMNS} FROM restaurant_rooms LIMIT {}",
            CONFIG.room_fetch_limit
        );
        let rooms = sqlx::query_as::<_, RoomRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<RoomRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        // ids are i64, safe to inline
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!("SELECT {ROOM_COLUMNS} FROM restaurant_rooms WHERE id IN ({id_list})");
        let rooms = sqlx::query_as::<_, RoomRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    async fn resolve_restaurant(&self, query: &str) -> Result<Option<RestaurantHit>> {
        let query = query.trim();
        if query.len() < 2 {
            return Ok(None);
        }
        let pattern = format!("%{}%", query.to_lowercase());
        let row = sqlx::query(
            "SELECT restaurant_name, address, lat, lng FROM restaurant_rooms \
             WHERE LOWER(restaurant_name) LIKE ? LIMIT 3",
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| RestaurantHit {
            name: row.get("restaurant_name"),
            address: row.get("address"),
            lat: row.get("lat"),
            lng: row.get("lng"),
        }))
    }
}
