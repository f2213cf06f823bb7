// src/tasks/embeddings.rs

//! Keeps the vector index in sync with room notes. Every room with notes
//! gets exactly one point in the index; rooms whose notes were cleared get
//! their point removed. A sqlite ledger records what was embedded so
//! unchanged rooms are skipped on re-runs.

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CONFIG;
use crate::retrieval::{EmbeddingProvider, VectorIndex};
use crate::utils::collapse_whitespace;

const PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatus {
    Upserted,
    Skipped,
    Deleted,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BackfillStats {
    pub upserted: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub errors: usize,
}

pub struct NoteEmbeddingTask {
    pool: SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl NoteEmbeddingTask {
    pub fn new(
        pool: SqlitePool,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            pool,
            embedder,
            index,
        }
    }

    /// Create the ledger table if it does not exist yet. Safe to call on
    /// every startup.
    pub async fn ensure_ledger(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS room_embeddings (
                room_id INTEGER PRIMARY KEY,
                model TEXT NOT NULL,
                text_hash TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Walk every room once and reconcile its index point with its notes.
    pub async fn run(&self) -> Result<BackfillStats> {
        info!("Starting room notes embedding sync");
        self.ensure_ledger().await?;

        let mut stats = BackfillStats::default();
        let mut offset: i64 = 0;

        loop {
            let rows = sqlx::query(
                "SELECT id, notes FROM restaurant_rooms ORDER BY id LIMIT ? OFFSET ?",
            )
            .bind(PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            if rows.is_empty() {
                break;
            }
            offset += rows.len() as i64;

            for row in &rows {
                let room_id: i64 = row.get("id");
                let notes: Option<String> = row.get("notes");
                match self.upsert_room(room_id, notes.as_deref().unwrap_or("")).await {
                    Ok(UpsertStatus::Upserted) => stats.upserted += 1,
                    Ok(UpsertStatus::Skipped) => stats.skipped += 1,
                    Ok(UpsertStatus::Deleted) => stats.deleted += 1,
                    Err(e) => {
                        warn!("Failed to sync embedding for room {}: {}", room_id, e);
                        stats.errors += 1;
                    }
                }
            }
        }

        info!(
            "Embedding sync complete: {} upserted, {} skipped, {} deleted, {} errors",
            stats.upserted, stats.skipped, stats.deleted, stats.errors
        );
        Ok(stats)
    }

    /// Reconcile a single room. Blank notes remove the point; unchanged
    /// notes (same hash under the same model) are a no-op.
    pub async fn upsert_room(&self, room_id: i64, notes: &str) -> Result<UpsertStatus> {
        let text = collapse_whitespace(notes);
        if text.is_empty() {
            self.index.remove(room_id).await?;
            sqlx::query("DELETE FROM room_embeddings WHERE room_id = ?")
                .bind(room_id)
                .execute(&self.pool)
                .await?;
            return Ok(UpsertStatus::Deleted);
        }

        let hash = sha256_hex(&text);
        let existing = sqlx::query("SELECT model, text_hash FROM room_embeddings WHERE room_id = ?")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = existing {
            let model: String = row.get("model");
            let text_hash: String = row.get("text_hash");
            if model == CONFIG.embedding_model && text_hash == hash {
                return Ok(UpsertStatus::Skipped);
            }
        }

        let vector = self.embedder.embed(&text).await?;
        if vector.len() != CONFIG.embedding_dimensions {
            return Err(anyhow!(
                "Embedding length mismatch for room {}: got {}, expected {}",
                room_id,
                vector.len(),
                CONFIG.embedding_dimensions
            ));
        }
        self.index.upsert(room_id, &vector).await?;

        sqlx::query(
            r#"
            INSERT INTO room_embeddings (room_id, model, text_hash, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(room_id) DO UPDATE SET
                model = excluded.model,
                text_hash = excluded.text_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(room_id)
        .bind(&CONFIG.embedding_model)
        .bind(&hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(UpsertStatus::Upserted)
    }
}

fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
