// crates/keepsake-server/src/db/memories.rs
// Memory storage and retrieval operations

use anyhow::{Context, Result};
use keepsake_types::{Memory, MemoryKind};
use rusqlite::{Connection, params};

/// Fields for a new memory row. Validation happens at the API boundary;
/// this layer only persists.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub elder_id: String,
    pub kind: MemoryKind,
    pub body: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub emotional_tone: Option<String>,
    pub extraction: Option<serde_json::Value>,
}

/// Filters for the list-memories operation.
#[derive(Debug, Clone)]
pub struct MemoryFilter {
    pub elder_id: String,
    pub kind: Option<MemoryKind>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Parse a Memory from a rusqlite Row with standard column order:
/// (id, elder_id, kind, body, image_url, extraction, tags, emotional_tone,
///  created_at, updated_at)
pub fn parse_memory_row(row: &rusqlite::Row) -> rusqlite::Result<Memory> {
    let kind_raw: String = row.get(2)?;
    let extraction_raw: Option<String> = row.get(5)?;
    let tags_raw: Option<String> = row.get(6)?;

    Ok(Memory {
        id: row.get(0)?,
        elder_id: row.get(1)?,
        // Rows predating a kind rename fall back to Other rather than failing the read
        kind: MemoryKind::parse(&kind_raw).unwrap_or(MemoryKind::Other),
        body: row.get(3)?,
        image_url: row.get(4)?,
        extraction: extraction_raw.and_then(|s| serde_json::from_str(&s).ok()),
        tags: tags_raw
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        emotional_tone: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const MEMORY_COLUMNS: &str = "id, elder_id, kind, body, image_url, extraction, tags, \
                              emotional_tone, created_at, updated_at";

/// Insert a memory and return the stored row (with db-assigned id and timestamps).
pub fn insert_memory(conn: &Connection, new: &NewMemory) -> Result<Memory> {
    let tags_json = serde_json::to_string(&new.tags)?;
    let extraction_json = new
        .extraction
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO memories (elder_id, kind, body, image_url, extraction, tags, emotional_tone)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.elder_id,
            new.kind.as_str(),
            new.body,
            new.image_url,
            extraction_json,
            tags_json,
            new.emotional_tone,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_memory(conn, id)?.context("inserted memory row not found")
}

/// Fetch one memory by id.
pub fn get_memory(conn: &Connection, id: i64) -> Result<Option<Memory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map([id], parse_memory_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Load the bounded recent window for an elder: the `limit` most recent
/// memories, newest first. This is the sole retrieval mechanism for
/// question answering - recency, no ranking.
pub fn recent_window(conn: &Connection, elder_id: &str, limit: usize) -> Result<Vec<Memory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE elder_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![elder_id, limit as i64], parse_memory_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Load memories created within one calendar day (server-local), oldest first.
pub fn memories_for_day(conn: &Connection, elder_id: &str, day: &str) -> Result<Vec<Memory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE elder_id = ?1 AND created_at >= ?2 AND created_at <= ?3
         ORDER BY created_at ASC, id ASC"
    ))?;

    let start = format!("{day} 00:00:00");
    let end = format!("{day} 23:59:59.999");
    let rows = stmt.query_map(params![elder_id, start, end], parse_memory_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List memories with optional filters and pagination.
/// Returns the page plus the total count matching the filters.
pub fn list_memories(conn: &Connection, filter: &MemoryFilter) -> Result<(Vec<Memory>, i64)> {
    let mut clauses = vec!["elder_id = ?".to_string()];
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(filter.elder_id.clone())];

    if let Some(kind) = filter.kind {
        clauses.push("kind = ?".to_string());
        args.push(Box::new(kind.as_str().to_string()));
    }
    if let Some(ref tag) = filter.tag {
        // Tags are stored as a JSON string array; match the quoted element
        clauses.push("tags LIKE ? ESCAPE '\\'".to_string());
        args.push(Box::new(format!("%\"{}\"%", escape_like(tag))));
    }
    if let Some(ref search) = filter.search {
        clauses.push("body LIKE ? ESCAPE '\\'".to_string());
        args.push(Box::new(format!("%{}%", escape_like(search))));
    }

    let where_clause = clauses.join(" AND ");

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM memories WHERE {where_clause}"),
        rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE {where_clause}
         ORDER BY created_at DESC, id DESC
         LIMIT ? OFFSET ?"
    ))?;

    args.push(Box::new(filter.limit));
    args.push(Box::new(filter.offset));

    let rows = stmt.query_map(
        rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
        parse_memory_row,
    )?;
    let memories = rows.collect::<Result<Vec<_>, _>>()?;

    Ok((memories, total))
}

/// Escape SQL LIKE wildcards so user text matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\") // Escape backslash first
        .replace('%', "\\%")
        .replace('_', "\\_")
}
