// src/retrieval/mod.rs

//! Semantic note retrieval: embed the free-text question, nearest-neighbor
//! over the room-notes index, restricted to the structural candidate set
//! when one exists. Retrieval failing is never fatal to a turn; callers
//! degrade to ranking without notes.

pub mod openai;
pub mod qdrant;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RecommendError;
use crate::utils::collapse_whitespace;

/// A room id plus similarity distance, ascending-is-closer. Ephemeral,
/// rebuilt per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedNote {
    pub room_id: i64,
    pub distance: f32,
}

/// Text-to-vector provider (fixed dimensionality).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Nearest-neighbor index over room-note embeddings.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-k closest points, optionally restricted to the given ids.
    /// Returns (room_id, distance) pairs.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        restrict_ids: Option<&[i64]>,
    ) -> anyhow::Result<Vec<(i64, f32)>>;

    /// Insert or replace the vector for a room.
    async fn upsert(&self, room_id: i64, vector: &[f32]) -> anyhow::Result<()>;

    /// Drop a room's vector (e.g. its notes were blanked).
    async fn remove(&self, room_id: i64) -> anyhow::Result<()>;
}

pub struct SemanticRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl SemanticRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Top-k notes for a free-text query, ascending distance. A query that
    /// normalizes to nothing is a no-op, not a fault. An empty candidate
    /// set searches the full corpus (no structural constraints yet and
    /// "filter matched nothing" are indistinguishable here).
    pub async fn retrieve(
        &self,
        query: &str,
        candidate_ids: &[i64],
        k: usize,
    ) -> Result<Vec<RetrievedNote>, RecommendError> {
        let normalized = collapse_whitespace(query);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed(&normalized)
            .await
            .map_err(|e| RecommendError::RetrievalUnavailable(e.to_string()))?;

        let restriction = (!candidate_ids.is_empty()).then_some(candidate_ids);
        let hits = self
            .index
            .query(&vector, k, restriction)
            .await
            .map_err(|e| RecommendError::RetrievalUnavailable(e.to_string()))?;

        let mut notes: Vec<RetrievedNote> = hits
            .into_iter()
            .map(|(room_id, distance)| RetrievedNote { room_id, distance })
            .collect();
        notes.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        notes.truncate(k);
        Ok(notes)
    }
}
