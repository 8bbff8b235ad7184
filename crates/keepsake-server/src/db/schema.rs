// db/schema.rs
// Database schema and migrations

use anyhow::Result;
use rusqlite::Connection;

/// Base schema. Idempotent - safe to run on every startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id INTEGER PRIMARY KEY,
    elder_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    body TEXT NOT NULL,
    image_url TEXT,
    -- JSON object: people/places/dates extracted by background enrichment
    extraction TEXT,
    -- JSON array of strings
    tags TEXT,
    emotional_tone TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_memories_elder_created
    ON memories(elder_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_memories_elder_kind
    ON memories(elder_id, kind);

CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    elder_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT,
    -- JSON array of memory ids shown as "matched"
    matched_memory_ids TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_questions_elder_created
    ON questions(elder_id, created_at DESC);

CREATE TABLE IF NOT EXISTS daily_summaries (
    id INTEGER PRIMARY KEY,
    elder_id TEXT NOT NULL,
    -- Calendar date, YYYY-MM-DD; one row per (elder, day)
    day TEXT NOT NULL,
    summary TEXT NOT NULL,
    memories_count INTEGER DEFAULT 0,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(elder_id, day)
);
"#;

/// Run all schema setup and migrations.
///
/// Called during pool initialization. Idempotent - checks for existing
/// tables/columns before making changes.
pub fn run_all_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_summaries_memories_count(conn)?;
    Ok(())
}

/// Add memories_count to daily_summaries created before the column existed.
fn migrate_summaries_memories_count(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "daily_summaries", "memories_count")? {
        conn.execute(
            "ALTER TABLE daily_summaries ADD COLUMN memories_count INTEGER DEFAULT 0",
            [],
        )?;
    }
    Ok(())
}

/// Check whether a column exists on a table.
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_all_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = open();
        // Running twice must not error
        run_all_migrations(&conn).unwrap();
    }

    #[test]
    fn test_summary_unique_key() {
        let conn = open();
        conn.execute(
            "INSERT INTO daily_summaries (elder_id, day, summary) VALUES ('e1', '2026-08-27', 'a')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO daily_summaries (elder_id, day, summary) VALUES ('e1', '2026-08-27', 'b')",
            [],
        );
        assert!(dup.is_err(), "duplicate (elder, day) must violate UNIQUE");
    }

    #[test]
    fn test_column_exists() {
        let conn = open();
        assert!(column_exists(&conn, "memories", "emotional_tone").unwrap());
        assert!(!column_exists(&conn, "memories", "no_such_column").unwrap());
    }
}
