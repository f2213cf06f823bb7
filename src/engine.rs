// src/engine.rs

//! Orchestration for one user turn. Each call is an independent, stateless
//! computation over the caller-supplied snapshot: no shared mutable state,
//! no cross-request caching.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::aggregate::{aggregate, RankingResult};
use crate::config::CONFIG;
use crate::error::RecommendError;
use crate::intake::{self, ChatMessage, ConversationExtractor, IntakeOutcome};
use crate::requirements::Requirements;
use crate::retrieval::{RetrievedNote, SemanticRetriever};
use crate::rooms::filter::StructuralFilter;
use crate::rooms::repository::RoomRepository;
use crate::rooms::types::GeoPoint;
use crate::scoring::score_room;

pub struct RecommendationEngine {
    repo: Arc<dyn RoomRepository>,
    retriever: SemanticRetriever,
    extractor: Arc<dyn ConversationExtractor>,
}

impl RecommendationEngine {
    pub fn new(
        repo: Arc<dyn RoomRepository>,
        retriever: SemanticRetriever,
        extractor: Arc<dyn ConversationExtractor>,
    ) -> Self {
        Self {
            repo,
            retriever,
            extractor,
        }
    }

    /// Run one extractor round-trip, merge the result, recompute missing
    /// fields. Never fails on extractor misbehavior; see the intake module.
    pub async fn advance_conversation(
        &self,
        history: &[ChatMessage],
        current: &Requirements,
    ) -> Result<IntakeOutcome, RecommendError> {
        intake::advance_conversation(self.extractor.as_ref(), history, current).await
    }

    /// Rank every visible room against the requirements. `origin` is the
    /// caller-geocoded query point, if any. Repository failures are hard
    /// (a partial ranking would silently bias results); retrieval failures
    /// degrade to ranking without notes.
    pub async fn rank(
        &self,
        reqs: &Requirements,
        origin: Option<GeoPoint>,
    ) -> Result<RankingResult, RecommendError> {
        let filter = StructuralFilter::from_requirements(reqs);

        // Both legs are read-only and independent; the candidate set only
        // gates the retriever, never the scorer.
        let (rooms, notes) = tokio::join!(self.repo.list_all(), self.retrieve_notes(reqs, &filter));
        let rooms = rooms.map_err(|e| RecommendError::Repository(e.to_string()))?;
        let notes = notes?;

        // A retrieval hit on a room with no notes text is stale index
        // content; drop it.
        let noted_ids: HashSet<i64> = rooms
            .iter()
            .filter(|room| room.has_notes())
            .map(|room| room.id)
            .collect();
        let notes: Vec<RetrievedNote> = notes
            .into_iter()
            .filter(|note| noted_ids.contains(&note.room_id))
            .collect();

        let scored = rooms
            .iter()
            .map(|room| score_room(room, reqs, origin))
            .collect();
        let mut result = aggregate(scored, reqs);
        result.notes = notes;

        debug!(
            restaurants = result.total_restaurants,
            rooms = result.total_rooms,
            notes = result.notes.len(),
            "ranking complete"
        );
        Ok(result)
    }

    async fn retrieve_notes(
        &self,
        reqs: &Requirements,
        filter: &StructuralFilter,
    ) -> Result<Vec<RetrievedNote>, RecommendError> {
        let Some(query) = reqs.restaurant_query.as_deref() else {
            return Ok(Vec::new());
        };

        let candidates = self
            .repo
            .list_by_structural_filter(filter)
            .await
            .map_err(|e| RecommendError::Repository(e.to_string()))?;

        let deadline = Duration::from_secs(CONFIG.retrieval_timeout);
        match tokio::time::timeout(
            deadline,
            self.retriever.retrieve(query, &candidates, CONFIG.retrieval_k),
        )
        .await
        {
            Ok(Ok(notes)) => Ok(notes),
            Ok(Err(e)) => {
                warn!("ranking without notes: {e}");
                Ok(Vec::new())
            }
            Err(_) => {
                warn!("semantic retrieval timed out after {}s", deadline.as_secs());
                Ok(Vec::new())
            }
        }
    }
}
