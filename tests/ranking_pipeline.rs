// tests/ranking_pipeline.rs

//! End-to-end ranking over in-memory fakes: structural scoring, restaurant
//! grouping, semantic notes, and the degraded paths.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;

use tablescout::engine::RecommendationEngine;
use tablescout::intake::{ChatMessage, ConversationExtractor};
use tablescout::requirements::Requirements;
use tablescout::retrieval::{EmbeddingProvider, SemanticRetriever, VectorIndex};
use tablescout::rooms::repository::RoomRepository;
use tablescout::rooms::types::RoomRecord;
use tablescout::RecommendError;

struct FakeRepo {
    rooms: Vec<RoomRecord>,
    fail: bool,
}

#[async_trait]
impl RoomRepository for FakeRepo {
    async fn list_all(&self) -> anyhow::Result<Vec<RoomRecord>> {
        if self.fail {
            return Err(anyhow!("database locked"));
        }
        Ok(self.rooms.clone())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoomRecord>> {
        Ok(self
            .rooms
            .iter()
            .filter(|room| ids.contains(&room.id))
            .cloned()
            .collect())
    }
}

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }
}

struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow!("provider down"))
    }
}

struct CannedIndex {
    hits: Vec<(i64, f32)>,
}

#[async_trait]
impl VectorIndex for CannedIndex {
    async fn query(
        &self,
        _vector: &[f32],
        _k: usize,
        restrict_ids: Option<&[i64]>,
    ) -> anyhow::Result<Vec<(i64, f32)>> {
        Ok(match restrict_ids {
            Some(ids) => self
                .hits
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .copied()
                .collect(),
            None => self.hits.clone(),
        })
    }

    async fn upsert(&self, _room_id: i64, _vector: &[f32]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _room_id: i64) -> anyhow::Result<()> {
        Ok(())
    }
}

struct NoopExtractor;

#[async_trait]
impl ConversationExtractor for NoopExtractor {
    async fn extract(
        &self,
        _history: &[ChatMessage],
        _current: &Requirements,
    ) -> anyhow::Result<String> {
        Ok("{}".to_string())
    }
}

fn room(id: i64, restaurant: &str, seated: i64) -> RoomRecord {
    RoomRecord {
        id,
        restaurant_name: restaurant.to_string(),
        room_name: format!("Room {id}"),
        seated_capacity: Some(seated),
        ..Default::default()
    }
}

fn engine(rooms: Vec<RoomRecord>, hits: Vec<(i64, f32)>) -> RecommendationEngine {
    engine_with(
        FakeRepo { rooms, fail: false },
        Arc::new(FixedEmbedder),
        hits,
    )
}

fn engine_with(
    repo: FakeRepo,
    embedder: Arc<dyn EmbeddingProvider>,
    hits: Vec<(i64, f32)>,
) -> RecommendationEngine {
    let retriever = SemanticRetriever::new(embedder, Arc::new(CannedIndex { hits }));
    RecommendationEngine::new(Arc::new(repo), retriever, Arc::new(NoopExtractor))
}

fn reqs(value: serde_json::Value) -> Requirements {
    Requirements::from_value(value).unwrap()
}

#[tokio::test]
async fn exact_capacity_fit_ranks_first() {
    let rooms = vec![
        room(1, "Oversized Hall", 40),
        room(2, "Perfect Fit", 12),
        room(3, "Too Small", 8),
    ];
    let result = engine(rooms, vec![])
        .rank(&reqs(json!({ "headcount": "12" })), None)
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 3);
    assert_eq!(result.total_rooms, 3);
    assert_eq!(result.top[0].restaurant_name, "Perfect Fit");
    assert_eq!(result.top[1].restaurant_name, "Oversized Hall");
    assert_eq!(result.top[2].restaurant_name, "Too Small");
    assert!(result.notes.is_empty());
}

#[tokio::test]
async fn rooms_grouped_under_their_restaurant() {
    let rooms = vec![
        room(1, "Carmen's", 40),
        room(2, "Carmen's", 12),
        room(3, "Tallow", 20),
    ];
    let result = engine(rooms, vec![])
        .rank(&reqs(json!({ "headcount": "12" })), None)
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 2);
    let carmens = result
        .top
        .iter()
        .find(|g| g.restaurant_name == "Carmen's")
        .unwrap();
    assert_eq!(carmens.all_rooms.len(), 2);
    assert_eq!(carmens.best_room.room.id, 2);
    for group in result.top.iter().chain(result.others.iter()) {
        for scored in &group.all_rooms {
            assert_eq!(scored.room.restaurant_name, group.restaurant_name);
        }
    }
}

#[tokio::test]
async fn notes_returned_only_for_rooms_with_notes() {
    let mut noted = room(1, "Carmen's", 12);
    noted.notes = Some("quiet back room with a long table".to_string());
    let bare = room(2, "Tallow", 12);

    let result = engine(vec![noted, bare], vec![(1, 0.2), (2, 0.4)])
        .rank(
            &reqs(json!({ "headcount": "12", "restaurantQuery": "quiet room" })),
            None,
        )
        .await
        .unwrap();

    let ids: Vec<i64> = result.notes.iter().map(|n| n.room_id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn no_query_skips_retrieval() {
    let mut noted = room(1, "Carmen's", 12);
    noted.notes = Some("wine cellar".to_string());
    let result = engine(vec![noted], vec![(1, 0.1)])
        .rank(&reqs(json!({ "headcount": "12" })), None)
        .await
        .unwrap();
    assert!(result.notes.is_empty());
}

#[tokio::test]
async fn retrieval_failure_degrades_to_structural_ranking() {
    let mut noted = room(1, "Carmen's", 12);
    noted.notes = Some("wine cellar".to_string());
    let repo = FakeRepo {
        rooms: vec![noted, room(2, "Tallow", 12)],
        fail: false,
    };
    let result = engine_with(repo, Arc::new(FailingEmbedder), vec![(1, 0.1)])
        .rank(
            &reqs(json!({ "headcount": "12", "restaurantQuery": "wine cellar" })),
            None,
        )
        .await
        .unwrap();

    assert!(result.notes.is_empty());
    assert_eq!(result.total_restaurants, 2);
}

#[tokio::test]
async fn repository_failure_is_fatal() {
    let repo = FakeRepo {
        rooms: vec![],
        fail: true,
    };
    let err = engine_with(repo, Arc::new(FixedEmbedder), vec![])
        .rank(&reqs(json!({ "headcount": "12" })), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RecommendError::Repository(_)));
}

#[tokio::test]
async fn empty_store_yields_empty_buckets() {
    let result = engine(vec![], vec![])
        .rank(&reqs(json!({ "headcount": "12" })), None)
        .await
        .unwrap();
    assert!(result.top.is_empty());
    assert!(result.others.is_empty());
    assert_eq!(result.total_restaurants, 0);
    assert_eq!(result.total_rooms, 0);
}
