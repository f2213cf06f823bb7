// src/intake/openai.rs

//! OpenAI-backed conversational extractor. Sends the intake system prompt,
//! the current snapshot and the dialogue, asks for a single JSON object
//! back. Output validation happens upstream; this client only moves bytes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::CONFIG;
use crate::intake::{ChatMessage, ChatRole, ConversationExtractor};
use crate::requirements::Requirements;

const SYSTEM_PROMPT: &str = "You are an intake concierge for private dining events.\n\
Your job is to extract structured requirements from the conversation.\n\
Ask at most ONE focused follow-up question only if critical info is missing.\n\
Do NOT ask about cake fees or corkage fees unless the user explicitly brings them up.\n\
If vibe is missing, ask about it as a secondary, optional preference (but do not block completion on it).\n\
If enough info is available, confirm briefly and say you are ready to recommend venues.\n\
Return a single JSON object with keys: assistantMessage, requirements, isComplete, missing.\n\
Requirements must only include these keys:\n\
areaLabel, radiusMiles, headcount, budgetTotal, needsAV, eventType, dateNeeded, timeNeeded, privacyLevel, noiseLevel, vibe, maxCakeFee, maxCorkageFee.\n\
Use strings for all text/number fields and boolean for needsAV.\n\
Missing should be an array of required field names.";

#[derive(Clone)]
pub struct OpenAiExtractor {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiExtractor {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_key: CONFIG.openai_api_key.clone(),
            url: CONFIG.openai_api_url("chat/completions"),
            model: CONFIG.intake_model.clone(),
        }
    }
}

impl Default for OpenAiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationExtractor for OpenAiExtractor {
    async fn extract(&self, history: &[ChatMessage], current: &Requirements) -> Result<String> {
        let mut messages = vec![
            json!({ "role": "system", "content": SYSTEM_PROMPT }),
            json!({
                "role": "system",
                "content": format!(
                    "Current requirements: {}",
                    serde_json::to_string(current).unwrap_or_else(|_| "{}".to_string())
                )
            }),
        ];
        for message in history {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(json!({ "role": role, "content": message.content }));
        }

        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "response_format": { "type": "json_object" },
            "messages": messages,
        });

        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(std::time::Duration::from_secs(CONFIG.openai_timeout))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "OpenAI intake call failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let content = resp_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("No content in OpenAI response"))?;

        Ok(content.to_string())
    }
}
