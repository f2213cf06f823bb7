// src/error.rs

//! Error taxonomy for the recommendation core.
//!
//! Extraction and retrieval failures are recovered close to where they
//! happen (the caller gets a clarifying message or a degraded ranking);
//! repository failures are surfaced hard, since ranking over an unknown
//! subset of rooms would silently bias results.

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// The conversational extractor returned output that failed schema
    /// validation. Absorbed by the intake layer, never shown to users.
    #[error("Extraction output malformed: {0}")]
    ExtractionMalformed(String),

    /// Embedding or vector-index call failed or timed out. Ranking
    /// continues without retrieved notes.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Room store call failed. Not recoverable within a ranking turn.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Caller-supplied payload failed boundary validation (unknown field,
    /// bad coercion, oversized history). The prior snapshot is untouched.
    #[error("Invalid requirements: {0}")]
    InvalidRequirements(String),
}
