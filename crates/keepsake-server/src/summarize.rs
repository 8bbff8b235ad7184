// crates/keepsake-server/src/summarize.rs
// Daily summarizer: aggregate one day's memories and questions into a
// short narrative, upserted per (elder, day)

use crate::db::{self, DatabasePool};
use crate::error::{KeepsakeError, Result};
use crate::llm::{CompletionBackend, prompt};
use crate::recall::validate_elder_id;
use chrono::NaiveDate;
use keepsake_types::DailySummary;
use std::sync::Arc;
use tracing::info;

/// Summary text used when a day has no memories and no questions.
/// The external service is not called for empty days.
pub const EMPTY_DAY_SUMMARY: &str = "No activity recorded for this day.";

/// Parse an optional YYYY-MM-DD date, defaulting to the server-local today.
pub fn resolve_day(date: Option<&str>) -> Result<String> {
    match date {
        Some(raw) => {
            let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                KeepsakeError::InvalidInput(format!("date must be YYYY-MM-DD, got '{raw}'"))
            })?;
            Ok(parsed.format("%Y-%m-%d").to_string())
        }
        None => Ok(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

/// Generate (or regenerate) the daily summary for an elder.
///
/// Idempotent at (elder, day) granularity: re-running overwrites the
/// existing row, last writer wins. Empty days short-circuit to a fixed
/// summary without touching the completion endpoint; the short-circuit
/// row is still persisted so listings stay uniform.
pub async fn generate_daily_summary(
    pool: &DatabasePool,
    backend: &Arc<dyn CompletionBackend>,
    elder_id: &str,
    date: Option<&str>,
) -> Result<DailySummary> {
    let elder_id = validate_elder_id(elder_id)?;
    let day = resolve_day(date)?;

    let (memories, questions) = {
        let elder = elder_id.clone();
        let day = day.clone();
        pool.interact(move |conn| {
            let memories = db::memories_for_day(conn, &elder, &day)?;
            let questions = db::questions_for_day(conn, &elder, &day)?;
            Ok((memories, questions))
        })
        .await
        .map_err(|e| KeepsakeError::Storage(format!("day fetch failed: {e}")))?
    };

    let memories_count = memories.len() as i64;

    let summary_text = if memories.is_empty() && questions.is_empty() {
        EMPTY_DAY_SUMMARY.to_string()
    } else {
        let prompt = prompt::summary_prompt(&day, &memories, &questions);
        backend.complete(&prompt.system, &prompt.user).await?
    };

    let stored = {
        let elder = elder_id.clone();
        let day_for_write = day.clone();
        let text = summary_text.clone();
        pool.interact(move |conn| {
            db::upsert_summary(conn, &elder, &day_for_write, &text, memories_count)
        })
        .await
        .map_err(|e| KeepsakeError::Storage(format!("summary upsert failed: {e}")))?
    };

    info!(
        elder_id = %elder_id,
        day = %day,
        memories = memories_count,
        questions = questions.len(),
        "Daily summary stored"
    );

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_day_explicit() {
        assert_eq!(resolve_day(Some("2026-08-27")).unwrap(), "2026-08-27");
        assert_eq!(resolve_day(Some(" 2026-01-02 ")).unwrap(), "2026-01-02");
    }

    #[test]
    fn test_resolve_day_rejects_malformed() {
        for bad in ["27/08/2026", "2026-13-01", "yesterday", ""] {
            let err = resolve_day(Some(bad)).unwrap_err();
            assert_eq!(err.status_code(), 400, "expected 400 for '{bad}'");
        }
    }

    #[test]
    fn test_resolve_day_defaults_to_today() {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(resolve_day(None).unwrap(), today);
    }
}
