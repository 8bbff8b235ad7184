// crates/keepsake-server/src/db/summaries.rs
// Daily summary storage: one row per (elder, day), upsert replaces

use anyhow::Result;
use keepsake_types::DailySummary;
use rusqlite::{Connection, params};

/// Parse a DailySummary from a rusqlite Row with standard column order:
/// (id, elder_id, day, summary, memories_count, created_at)
fn parse_summary_row(row: &rusqlite::Row) -> rusqlite::Result<DailySummary> {
    Ok(DailySummary {
        id: row.get(0)?,
        elder_id: row.get(1)?,
        day: row.get(2)?,
        summary: row.get(3)?,
        memories_count: row.get(4).unwrap_or(0),
        created_at: row.get(5)?,
    })
}

/// Insert or overwrite the summary for (elder, day). Last writer wins.
pub fn upsert_summary(
    conn: &Connection,
    elder_id: &str,
    day: &str,
    summary: &str,
    memories_count: i64,
) -> Result<DailySummary> {
    conn.execute(
        "INSERT INTO daily_summaries (elder_id, day, summary, memories_count)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(elder_id, day) DO UPDATE SET
             summary = excluded.summary,
             memories_count = excluded.memories_count,
             created_at = CURRENT_TIMESTAMP",
        params![elder_id, day, summary, memories_count],
    )?;

    conn.query_row(
        "SELECT id, elder_id, day, summary, memories_count, created_at
         FROM daily_summaries WHERE elder_id = ?1 AND day = ?2",
        params![elder_id, day],
        parse_summary_row,
    )
    .map_err(Into::into)
}

/// Fetch the summary for one (elder, day), if present.
pub fn get_summary(conn: &Connection, elder_id: &str, day: &str) -> Result<Option<DailySummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, elder_id, day, summary, memories_count, created_at
         FROM daily_summaries WHERE elder_id = ?1 AND day = ?2",
    )?;
    let mut rows = stmt.query_map(params![elder_id, day], parse_summary_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Recent summaries for an elder, newest day first.
pub fn list_summaries(conn: &Connection, elder_id: &str, limit: i64) -> Result<Vec<DailySummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, elder_id, day, summary, memories_count, created_at
         FROM daily_summaries
         WHERE elder_id = ?1
         ORDER BY day DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![elder_id, limit], parse_summary_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
