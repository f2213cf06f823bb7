// tests/intake_flow.rs

//! Intake turns against a scripted extractor: merge flow, completion, and
//! the malformed-output fallback.

use async_trait::async_trait;
use serde_json::json;

use tablescout::intake::{
    advance_conversation, ChatMessage, ChatRole, ConversationExtractor, IntakePhase,
    FALLBACK_MESSAGE,
};
use tablescout::requirements::Requirements;

struct ScriptedExtractor {
    reply: anyhow::Result<String>,
}

impl ScriptedExtractor {
    fn ok(reply: serde_json::Value) -> Self {
        Self {
            reply: Ok(reply.to_string()),
        }
    }

    fn raw(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(anyhow::anyhow!("upstream timeout")),
        }
    }
}

#[async_trait]
impl ConversationExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _history: &[ChatMessage],
        _current: &Requirements,
    ) -> anyhow::Result<String> {
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(e) => Err(anyhow::anyhow!("{e}")),
        }
    }
}

fn user(content: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: ChatRole::User,
        content: content.to_string(),
    }]
}

fn reqs(value: serde_json::Value) -> Requirements {
    Requirements::from_value(value).unwrap()
}

#[tokio::test]
async fn extracted_fields_merge_into_snapshot() {
    let extractor = ScriptedExtractor::ok(json!({
        "assistantMessage": "Got it. What is your budget?",
        "requirements": { "areaLabel": "Oakland", "headcount": 12 },
        "isComplete": false,
        "missing": ["budgetTotal"]
    }));
    let current = reqs(json!({ "dateNeeded": "June 3", "timeNeeded": "7pm" }));

    let outcome = advance_conversation(&extractor, &user("12 of us in Oakland"), &current)
        .await
        .unwrap();

    assert_eq!(outcome.requirements.area_label.as_deref(), Some("Oakland"));
    assert_eq!(outcome.requirements.headcount(), Some(12));
    assert_eq!(outcome.requirements.date_needed.as_deref(), Some("June 3"));
    assert!(!outcome.is_complete);
    assert_eq!(outcome.missing, vec!["budgetTotal"]);
    assert_eq!(outcome.phase(), IntakePhase::Collecting);
}

#[tokio::test]
async fn completion_is_recomputed_not_trusted() {
    // The extractor claims incomplete, but every required field is present
    // after the merge.
    let extractor = ScriptedExtractor::ok(json!({
        "assistantMessage": "Anything else?",
        "requirements": { "budgetTotal": "3000" },
        "isComplete": false,
        "missing": ["budgetTotal"]
    }));
    let current = reqs(json!({
        "areaLabel": "Oakland",
        "headcount": "12",
        "dateNeeded": "June 3",
        "timeNeeded": "7pm"
    }));

    let outcome = advance_conversation(&extractor, &user("3k total"), &current)
        .await
        .unwrap();

    assert!(outcome.is_complete);
    assert!(outcome.missing.is_empty());
    assert_eq!(outcome.phase(), IntakePhase::Ready);
}

#[tokio::test]
async fn malformed_json_keeps_prior_snapshot() {
    let extractor = ScriptedExtractor::raw("here you go: {not json");
    let current = reqs(json!({ "areaLabel": "Oakland" }));

    let outcome = advance_conversation(&extractor, &user("hello"), &current)
        .await
        .unwrap();

    assert_eq!(outcome.requirements, current);
    assert_eq!(outcome.assistant_message, FALLBACK_MESSAGE);
    assert!(!outcome.is_complete);
    assert!(outcome.missing.contains(&"headcount".to_string()));
}

#[tokio::test]
async fn invalid_requirements_guess_is_a_merge_noop() {
    let extractor = ScriptedExtractor::ok(json!({
        "assistantMessage": "Noted!",
        "requirements": { "cuisine": "italian" }
    }));
    let current = reqs(json!({ "areaLabel": "Oakland" }));

    let outcome = advance_conversation(&extractor, &user("something italian"), &current)
        .await
        .unwrap();

    // Unknown fields invalidate the guess; the turn becomes message-only.
    assert_eq!(outcome.requirements, current);
    assert_eq!(outcome.assistant_message, "Noted!");
}

#[tokio::test]
async fn extractor_failure_falls_back() {
    let extractor = ScriptedExtractor::failing();
    let current = reqs(json!({ "areaLabel": "Oakland" }));

    let outcome = advance_conversation(&extractor, &user("hi"), &current)
        .await
        .unwrap();

    assert_eq!(outcome.requirements, current);
    assert_eq!(outcome.assistant_message, FALLBACK_MESSAGE);
}

#[tokio::test]
async fn blank_extracted_values_never_clear_fields() {
    let extractor = ScriptedExtractor::ok(json!({
        "assistantMessage": "Sure.",
        "requirements": { "areaLabel": "", "headcount": "16" }
    }));
    let current = reqs(json!({ "areaLabel": "Oakland", "headcount": "12" }));

    let outcome = advance_conversation(&extractor, &user("make it 16"), &current)
        .await
        .unwrap();

    assert_eq!(outcome.requirements.area_label.as_deref(), Some("Oakland"));
    assert_eq!(outcome.requirements.headcount(), Some(16));
}

#[tokio::test]
async fn oversized_history_is_rejected() {
    let extractor = ScriptedExtractor::raw("{}");
    let history = vec![ChatMessage {
        role: ChatRole::User,
        content: "x".repeat(5000),
    }];
    let result = advance_conversation(&extractor, &history, &Requirements::default()).await;
    assert!(result.is_err());
}
