// src/intake/mod.rs

//! Conversational intake: one extractor round-trip per user turn, folded
//! into the running requirements snapshot. The extractor is an untrusted
//! producer; anything malformed makes the turn a merge no-op and the user
//! gets a clarifying message instead of an error.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RecommendError;
use crate::requirements::{self, Requirements, REQUIRED_FIELDS};

const MAX_MESSAGES: usize = 40;
const MAX_MESSAGE_CHARS: usize = 4000;
const MAX_TOTAL_CHARS: usize = 20_000;

pub const FALLBACK_MESSAGE: &str = "I had trouble extracting the details. \
     Could you confirm the location, headcount, budget, date, and time?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Where the intake conversation stands: still collecting required fields,
/// or ready to rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakePhase {
    Collecting,
    Ready,
}

/// Result of one intake turn.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub assistant_message: String,
    pub requirements: Requirements,
    pub is_complete: bool,
    pub missing: Vec<String>,
}

impl IntakeOutcome {
    pub fn phase(&self) -> IntakePhase {
        if self.missing.is_empty() {
            IntakePhase::Ready
        } else {
            IntakePhase::Collecting
        }
    }
}

/// One extractor round-trip: dialogue history plus the current snapshot in,
/// raw model output (expected to be a JSON object) back.
#[async_trait]
pub trait ConversationExtractor: Send + Sync {
    async fn extract(
        &self,
        history: &[ChatMessage],
        current: &Requirements,
    ) -> anyhow::Result<String>;
}

/// Shape the extractor is asked to produce. Only `assistant_message` is
/// load-bearing; the requirements guess is validated separately and the
/// extractor's own completeness claims are recomputed, not trusted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractorReply {
    assistant_message: String,
    #[serde(default)]
    requirements: Option<serde_json::Value>,
    #[serde(default)]
    #[allow(dead_code)]
    is_complete: Option<bool>,
    #[serde(default)]
    #[allow(dead_code)]
    missing: Option<Vec<String>>,
}

/// Run one intake turn. Extraction failures of any kind fall back to the
/// prior snapshot with a canonical clarifying message; only boundary
/// violations on the caller's own payload are surfaced as errors.
pub async fn advance_conversation(
    extractor: &dyn ConversationExtractor,
    history: &[ChatMessage],
    current: &Requirements,
) -> Result<IntakeOutcome, RecommendError> {
    validate_history(history)?;

    let raw = match extractor.extract(history, current).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("extractor call failed, keeping prior snapshot: {e}");
            return Ok(fallback_outcome(current));
        }
    };

    let reply: ExtractorReply = match serde_json::from_str(&raw) {
        Ok(reply) => reply,
        Err(e) => {
            let err = RecommendError::ExtractionMalformed(e.to_string());
            warn!("{err}");
            return Ok(fallback_outcome(current));
        }
    };
    if reply.assistant_message.trim().is_empty() {
        warn!("{}", RecommendError::ExtractionMalformed("empty assistant message".into()));
        return Ok(fallback_outcome(current));
    }

    // A guess that fails validation is treated as "no new information",
    // not as a reason to fail the turn.
    let guess = match reply.requirements {
        Some(value) => match Requirements::from_value(value) {
            Ok(guess) => guess,
            Err(e) => {
                warn!("discarding invalid requirements guess: {e}");
                Requirements::default()
            }
        },
        None => Requirements::default(),
    };

    let merged = requirements::merge(current, &guess);
    let missing = missing_as_strings(&merged);
    Ok(IntakeOutcome {
        assistant_message: reply.assistant_message,
        is_complete: missing.is_empty(),
        requirements: merged,
        missing,
    })
}

fn fallback_outcome(current: &Requirements) -> IntakeOutcome {
    let missing = missing_as_strings(current);
    IntakeOutcome {
        assistant_message: FALLBACK_MESSAGE.to_string(),
        requirements: current.clone(),
        is_complete: missing.is_empty(),
        missing,
    }
}

fn missing_as_strings(reqs: &Requirements) -> Vec<String> {
    requirements::missing_required(reqs, REQUIRED_FIELDS)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn validate_history(history: &[ChatMessage]) -> Result<(), RecommendError> {
    if history.is_empty() || history.len() > MAX_MESSAGES {
        return Err(RecommendError::InvalidRequirements(format!(
            "history must contain 1..={MAX_MESSAGES} messages"
        )));
    }
    let mut total = 0;
    for message in history {
        let len = message.content.len();
        if len == 0 || len > MAX_MESSAGE_CHARS {
            return Err(RecommendError::InvalidRequirements(format!(
                "message length must be 1..={MAX_MESSAGE_CHARS} characters"
            )));
        }
        total += len;
    }
    if total > MAX_TOTAL_CHARS {
        return Err(RecommendError::InvalidRequirements(
            "history exceeds total size limit".to_string(),
        ));
    }
    Ok(())
}
