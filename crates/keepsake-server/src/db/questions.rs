// crates/keepsake-server/src/db/questions.rs
// Question/answer audit trail

use anyhow::Result;
use keepsake_types::Question;
use rusqlite::{Connection, params};

/// Parse a Question from a rusqlite Row with standard column order:
/// (id, elder_id, question, answer, matched_memory_ids, created_at)
fn parse_question_row(row: &rusqlite::Row) -> rusqlite::Result<Question> {
    let matched_raw: Option<String> = row.get(4)?;
    Ok(Question {
        id: row.get(0)?,
        elder_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        matched_memory_ids: matched_raw
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

/// Insert one question row with its answer and matched memory ids.
pub fn insert_question(
    conn: &Connection,
    id: &str,
    elder_id: &str,
    question: &str,
    answer: &str,
    matched_memory_ids: &[i64],
) -> Result<()> {
    let matched_json = serde_json::to_string(matched_memory_ids)?;
    conn.execute(
        "INSERT INTO questions (id, elder_id, question, answer, matched_memory_ids)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, elder_id, question, answer, matched_json],
    )?;
    Ok(())
}

/// Recent question history for an elder, newest first.
pub fn list_questions(conn: &Connection, elder_id: &str, limit: i64) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        "SELECT id, elder_id, question, answer, matched_memory_ids, created_at
         FROM questions
         WHERE elder_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![elder_id, limit], parse_question_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Questions asked within one calendar day, oldest first.
pub fn questions_for_day(conn: &Connection, elder_id: &str, day: &str) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        "SELECT id, elder_id, question, answer, matched_memory_ids, created_at
         FROM questions
         WHERE elder_id = ?1 AND created_at >= ?2 AND created_at <= ?3
         ORDER BY created_at ASC, id ASC",
    )?;
    let start = format!("{day} 00:00:00");
    let end = format!("{day} 23:59:59.999");
    let rows = stmt.query_map(params![elder_id, start, end], parse_question_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
