// src/lib.rs

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod intake;
pub mod requirements;
pub mod retrieval;
pub mod rooms;
pub mod scoring;
pub mod tasks;
pub mod utils;

pub use error::RecommendError;

use std::sync::Once;

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let level = config::CONFIG
            .log_level
            .parse()
            .unwrap_or(tracing::Level::INFO);
        let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    });
}
