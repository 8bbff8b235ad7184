// src/web/api.rs
// REST API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use keepsake_types::{
    ApiResponse, AskRequest, AskResponse, CreateMemoryRequest, GenerateSummaryRequest, Memory,
    MemoryKind, MemoryPage, Pagination, SummaryResponse,
};
use serde::Deserialize;

use crate::db::{self, MemoryFilter, NewMemory};
use crate::error::{KeepsakeError, Result};
use crate::recall::validate_elder_id;
use crate::web::state::AppState;
use crate::{qa, summarize};

/// Memory body length bounds, after trimming
const BODY_MAX_CHARS: usize = 5000;

/// List-memories page size bounds
const LIST_LIMIT_DEFAULT: i64 = 50;
const LIST_LIMIT_MAX: i64 = 200;
/// List-summaries bounds
const SUMMARIES_LIMIT_DEFAULT: i64 = 7;
const SUMMARIES_LIMIT_MAX: i64 = 100;
/// Question history bounds
const QUESTIONS_LIMIT_DEFAULT: i64 = 20;
const QUESTIONS_LIMIT_MAX: i64 = 100;

/// Clamp a requested page size into [1, max]. Out-of-range values are
/// clamped, not rejected.
fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

// ═══════════════════════════════════════
// HEALTH
// ═══════════════════════════════════════

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ═══════════════════════════════════════
// ASK
// ═══════════════════════════════════════

pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse> {
    let backend = state.backend()?;
    let outcome = qa::ask(&state.pool, backend, &req.elder_id, &req.question).await?;

    Ok(Json(ApiResponse::ok(AskResponse {
        answer: outcome.answer,
        matched_memories: outcome.matched_memories,
        recorded: outcome.recorded,
    })))
}

// ═══════════════════════════════════════
// MEMORY API
// ═══════════════════════════════════════

pub async fn create_memory(
    State(state): State<AppState>,
    Json(req): Json<CreateMemoryRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug> {
    let elder_id = validate_elder_id(&req.elder_id)?;

    let kind = MemoryKind::parse(&req.kind).ok_or_else(|| {
        KeepsakeError::InvalidInput(format!(
            "unknown memory kind '{}'; expected one of: {}",
            req.kind,
            MemoryKind::ALL.map(|k| k.as_str()).join(", ")
        ))
    })?;

    let body = req.body.trim().to_string();
    if body.is_empty() {
        return Err(KeepsakeError::InvalidInput("body is required".into()));
    }
    if body.chars().count() > BODY_MAX_CHARS {
        return Err(KeepsakeError::InvalidInput(format!(
            "body must be at most {BODY_MAX_CHARS} characters"
        )));
    }

    let new = NewMemory {
        elder_id,
        kind,
        body,
        image_url: req.image_url,
        tags: req.tags.unwrap_or_default(),
        emotional_tone: req.emotional_tone,
        extraction: req.extraction,
    };

    let created: Memory = state
        .pool
        .interact(move |conn| db::insert_memory(conn, &new))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("memory insert failed: {e}")))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

#[derive(Debug, Deserialize)]
pub struct ListMemoriesParams {
    pub elder_id: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

pub async fn list_memories(
    State(state): State<AppState>,
    Query(params): Query<ListMemoriesParams>,
) -> Result<impl IntoResponse> {
    let elder_id = validate_elder_id(&params.elder_id)?;

    let kind = match params.kind.as_deref() {
        Some(raw) => Some(MemoryKind::parse(raw).ok_or_else(|| {
            KeepsakeError::InvalidInput(format!("unknown memory kind '{raw}'"))
        })?),
        None => None,
    };

    let limit = clamp_limit(params.limit, LIST_LIMIT_DEFAULT, LIST_LIMIT_MAX);
    let offset = params.offset.unwrap_or(0).max(0);

    let filter = MemoryFilter {
        elder_id,
        kind,
        tag: params.tag.filter(|t| !t.trim().is_empty()),
        search: params.search.filter(|s| !s.trim().is_empty()),
        limit,
        offset,
    };

    let (data, total) = state
        .pool
        .interact(move |conn| db::list_memories(conn, &filter))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("memory list failed: {e}")))?;

    Ok(Json(ApiResponse::ok(MemoryPage {
        data,
        pagination: Pagination {
            limit,
            offset,
            total,
        },
    })))
}

pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let found = state
        .pool
        .interact(move |conn| db::get_memory(conn, id))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("memory fetch failed: {e}")))?;

    match found {
        Some(memory) => Ok(Json(ApiResponse::ok(memory)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Memory>::err("memory not found")),
        )
            .into_response()),
    }
}

// ═══════════════════════════════════════
// SUMMARIES
// ═══════════════════════════════════════

pub async fn generate_summary(
    State(state): State<AppState>,
    Json(req): Json<GenerateSummaryRequest>,
) -> Result<impl IntoResponse> {
    let backend = state.backend()?;
    let stored =
        summarize::generate_daily_summary(&state.pool, backend, &req.elder_id, req.date.as_deref())
            .await?;

    Ok(Json(ApiResponse::ok(SummaryResponse {
        summary: stored.summary,
        memories_count: stored.memories_count,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListSummariesParams {
    pub elder_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn list_summaries(
    State(state): State<AppState>,
    Query(params): Query<ListSummariesParams>,
) -> Result<impl IntoResponse> {
    let elder_id = validate_elder_id(&params.elder_id)?;

    // A specific date returns a single-element (or empty) list
    if let Some(raw) = params.date.as_deref() {
        let day = summarize::resolve_day(Some(raw))?;
        let found = state
            .pool
            .interact(move |conn| db::get_summary(conn, &elder_id, &day))
            .await
            .map_err(|e| KeepsakeError::Storage(format!("summary fetch failed: {e}")))?;
        let data: Vec<_> = found.into_iter().collect();
        return Ok(Json(ApiResponse::ok(data)));
    }

    let limit = clamp_limit(params.limit, SUMMARIES_LIMIT_DEFAULT, SUMMARIES_LIMIT_MAX);
    let data = state
        .pool
        .interact(move |conn| db::list_summaries(conn, &elder_id, limit))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("summary list failed: {e}")))?;

    Ok(Json(ApiResponse::ok(data)))
}

// ═══════════════════════════════════════
// QUESTION HISTORY
// ═══════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct ListQuestionsParams {
    pub elder_id: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsParams>,
) -> Result<impl IntoResponse> {
    let elder_id = validate_elder_id(&params.elder_id)?;
    let limit = clamp_limit(params.limit, QUESTIONS_LIMIT_DEFAULT, QUESTIONS_LIMIT_MAX);

    let data = state
        .pool
        .interact(move |conn| db::list_questions(conn, &elder_id, limit))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("question list failed: {e}")))?;

    Ok(Json(ApiResponse::ok(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_defaults() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
    }

    #[test]
    fn test_clamp_limit_out_of_range() {
        // Oversized values clamp to the maximum rather than erroring
        assert_eq!(clamp_limit(Some(500), 50, 200), 200);
        assert_eq!(clamp_limit(Some(0), 50, 200), 1);
        assert_eq!(clamp_limit(Some(-3), 50, 200), 1);
    }

    #[test]
    fn test_clamp_limit_in_range_passthrough() {
        assert_eq!(clamp_limit(Some(25), 50, 200), 25);
    }
}
