// crates/keepsake-server/src/qa.rs
// Ask-question pipeline: validate -> fetch window -> prompt -> complete -> record
//
// The audit write at the end is best-effort: by then the caller already has
// a valid answer, so a failed insert is logged and reported via the
// `recorded` flag instead of failing the request.

use crate::db::{self, DatabasePool};
use crate::error::Result;
use crate::llm::{CompletionBackend, prompt};
use crate::recall;
use keepsake_types::Memory;
use std::sync::Arc;
use tracing::info;

/// Result of one ask-question operation.
///
/// `recorded` distinguishes "answer produced" from "audit row persisted";
/// when it is false the answer was still delivered but history will not
/// show this exchange.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub matched_memories: Vec<Memory>,
    pub recorded: bool,
}

/// Answer a question from an elder's recorded memories.
///
/// The full recent window grounds the completion call; the returned
/// matched list is the independent display-only keyword subset.
pub async fn ask(
    pool: &DatabasePool,
    backend: &Arc<dyn CompletionBackend>,
    elder_id: &str,
    question: &str,
) -> Result<AskOutcome> {
    let elder_id = recall::validate_elder_id(elder_id)?;
    let question = recall::validate_question(question)?;

    let window = recall::fetch_recent_window(pool, &elder_id).await?;
    let matched = recall::keyword_matches(&question, &window);

    let prompt = prompt::answer_prompt(&window, &question);
    let answer = backend.complete(&prompt.system, &prompt.user).await?;

    let recorded = record_question(pool, &elder_id, &question, &answer, &matched).await;

    info!(
        elder_id = %elder_id,
        window = window.len(),
        matched = matched.len(),
        recorded,
        "Question answered"
    );

    Ok(AskOutcome {
        answer,
        matched_memories: matched,
        recorded,
    })
}

/// Persist the question/answer audit row. Best-effort: failures are logged
/// at warn by the pool helper and surface only as `false`.
async fn record_question(
    pool: &DatabasePool,
    elder_id: &str,
    question: &str,
    answer: &str,
    matched: &[Memory],
) -> bool {
    let id = uuid::Uuid::new_v4().to_string();
    let elder_id = elder_id.to_string();
    let question = question.to_string();
    let answer = answer.to_string();
    let matched_ids: Vec<i64> = matched.iter().map(|m| m.id).collect();

    pool.try_interact_warn("question audit insert", move |conn| {
        db::insert_question(conn, &id, &elder_id, &question, &answer, &matched_ids)
    })
    .await
    .is_some()
}
