// src/config/mod.rs

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    // ── OpenAI Configuration
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub intake_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub openai_timeout: u64,

    // ── Qdrant Configuration
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub qdrant_timeout: u64,

    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Ranking Pipeline
    pub retrieval_k: usize,
    pub retrieval_timeout: u64,
    pub candidate_cap: usize,
    pub room_fetch_limit: usize,

    // ── Logging Configuration
    pub log_level: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        // .env is optional; plain environment variables work too.
        let _ = dotenvy::dotenv();

        Self {
            openai_api_key: env_var_or("OPENAI_API_KEY", String::new()),
            openai_base_url: env_var_or(
                "OPENAI_BASE_URL",
                "https://api.openai.com/v1".to_string(),
            ),
            intake_model: env_var_or("SCOUT_INTAKE_MODEL", "gpt-4o-mini".to_string()),
            embedding_model: env_var_or(
                "SCOUT_EMBEDDING_MODEL",
                "text-embedding-3-small".to_string(),
            ),
            embedding_dimensions: env_var_or("SCOUT_EMBEDDING_DIM", 1536),
            openai_timeout: env_var_or("SCOUT_OPENAI_TIMEOUT", 60),
            qdrant_url: env_var_or("QDRANT_URL", "http://localhost:6333".to_string()),
            qdrant_collection: env_var_or("QDRANT_COLLECTION", "room-notes".to_string()),
            qdrant_timeout: env_var_or("SCOUT_QDRANT_TIMEOUT", 10),
            database_url: env_var_or("DATABASE_URL", "sqlite:./tablescout.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            retrieval_k: env_var_or("SCOUT_RETRIEVAL_K", 6),
            retrieval_timeout: env_var_or("SCOUT_RETRIEVAL_TIMEOUT", 10),
            candidate_cap: env_var_or("SCOUT_CANDIDATE_CAP", 500),
            room_fetch_limit: env_var_or("SCOUT_ROOM_FETCH_LIMIT", 1000),
            log_level: env_var_or("SCOUT_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Full OpenAI API URL for a given endpoint.
    pub fn openai_api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.openai_base_url.trim_end_matches('/'), endpoint)
    }

    /// Qdrant connection settings as a tuple.
    pub fn qdrant_config(&self) -> (String, String, usize) {
        (
            self.qdrant_url.clone(),
            self.qdrant_collection.clone(),
            self.embedding_dimensions,
        )
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<ScoutConfig> = Lazy::new(ScoutConfig::from_env);
