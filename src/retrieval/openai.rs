// src/retrieval/openai.rs

//! OpenAI embeddings over plain reqwest. No SDK wrapper; the response
//! shape is stable enough to walk by hand.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::CONFIG;
use crate::retrieval::EmbeddingProvider;

#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    api_key: String,
    url: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_key: CONFIG.openai_api_key.clone(),
            url: CONFIG.openai_api_url("embeddings"),
            model: CONFIG.embedding_model.clone(),
            dimensions: CONFIG.embedding_dimensions,
        }
    }
}

impl Default for OpenAiEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let req_body = json!({
            "input": text,
            "model": self.model,
            "encoding_format": "float",
        });
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req_body)
            .timeout(std::time::Duration::from_secs(CONFIG.openai_timeout))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "OpenAI embedding failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let embedding: Vec<f32> = resp_json["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| anyhow!("No embedding in OpenAI response"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        if embedding.len() != self.dimensions {
            return Err(anyhow!(
                "Embedding length mismatch: got {}, expected {}",
                embedding.len(),
                self.dimensions
            ));
        }

        Ok(embedding)
    }
}
