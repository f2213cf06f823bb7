// src/retrieval/qdrant.rs

//! Qdrant-backed room-notes index, driven over its REST API with reqwest.
//! One point per room, point id = room id.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::CONFIG;
use crate::retrieval::VectorIndex;

pub struct QdrantRoomIndex {
    pub client: Client,
    pub base_url: String,
    pub collection: String,
}

impl QdrantRoomIndex {
    pub fn new<S: Into<String>>(client: Client, base_url: S, collection: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            collection: collection.into(),
        }
    }

    pub fn from_config() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(CONFIG.qdrant_timeout))
            .build()
            .unwrap_or_default();
        Self::new(
            client,
            CONFIG.qdrant_url.clone(),
            CONFIG.qdrant_collection.clone(),
        )
    }

    /// Create the collection if it does not exist yet. Safe to call on
    /// every startup.
    pub async fn ensure_collection(&self) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }

        let req_body = json!({
            "vectors": {
                "size": CONFIG.embedding_dimensions,
                "distance": "Cosine"
            }
        });
        let resp = self.client.put(&url).json(&req_body).send().await?;

        let status = resp.status();
        let err_body = resp.text().await.unwrap_or_default();
        if status.is_success() || status.as_u16() == 409 || err_body.contains("already exists") {
            Ok(())
        } else {
            Err(anyhow!("Failed to create Qdrant collection: {}", err_body))
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantRoomIndex {
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        restrict_ids: Option<&[i64]>,
    ) -> Result<Vec<(i64, f32)>> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );

        let mut req_body = json!({
            "vector": vector,
            "limit": k,
            "with_payload": false,
        });
        if let Some(ids) = restrict_ids {
            req_body["filter"] = json!({ "must": [ { "has_id": ids } ] });
        }

        let resp = self
            .client
            .post(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| anyhow!("Qdrant search error: {}", e))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "Qdrant search failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let mut hits = Vec::new();
        if let Some(points) = resp_json.get("result").and_then(|r| r.as_array()) {
            for point in points {
                let Some(id) = point.get("id").and_then(|id| id.as_i64()) else {
                    continue;
                };
                // Qdrant reports cosine similarity; callers want ascending
                // distance.
                let score = point.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0);
                hits.push((id, (1.0 - score) as f32));
            }
        }
        Ok(hits)
    }

    async fn upsert(&self, room_id: i64, vector: &[f32]) -> Result<()> {
        let url = format!("{}/collections/{}/points", self.base_url, self.collection);
        let req_body = json!({
            "points": [ {
                "id": room_id,
                "vector": vector,
                "payload": { "room_id": room_id },
            } ]
        });

        let resp = self
            .client
            .put(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| anyhow!("Qdrant upsert error: {}", e))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "Qdrant upsert failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }
        Ok(())
    }

    async fn remove(&self, room_id: i64) -> Result<()> {
        let url = format!(
            "{}/collections/{}/points/delete",
            self.base_url, self.collection
        );
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "points": [room_id] }))
            .send()
            .await
            .map_err(|e| anyhow!("Qdrant delete error: {}", e))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "Qdrant delete failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }
        Ok(())
    }
}
