// src/rooms/mod.rs

pub mod filter;
pub mod repository;
pub mod sqlite;
pub mod types;

pub use filter::StructuralFilter;
pub use repository::RoomRepository;
pub use sqlite::SqliteRoomStore;
pub use types::{GeoPoint, RestaurantHit, RoomRecord};
