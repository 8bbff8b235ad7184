// crates/keepsake-types/src/lib.rs
// Shared types for Keepsake (native + WASM compatible)
// No native-only dependencies allowed here

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════
// DOMAIN TYPES
// ═══════════════════════════════════════

/// Kind of a recorded memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Story,
    Person,
    Event,
    Medication,
    Routine,
    Preference,
    Other,
}

impl MemoryKind {
    /// All valid kinds, for validation messages
    pub const ALL: [MemoryKind; 7] = [
        Self::Story,
        Self::Person,
        Self::Event,
        Self::Medication,
        Self::Routine,
        Self::Preference,
        Self::Other,
    ];

    /// Parse a kind from its lowercase wire name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "story" => Some(Self::Story),
            "person" => Some(Self::Person),
            "event" => Some(Self::Event),
            "medication" => Some(Self::Medication),
            "routine" => Some(Self::Routine),
            "preference" => Some(Self::Preference),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Person => "person",
            Self::Event => "event",
            Self::Medication => "medication",
            Self::Routine => "routine",
            Self::Preference => "preference",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded memory tied to an elder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: i64,
    pub elder_id: String,
    pub kind: MemoryKind,
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Open key-value map filled by background extraction (people/places/dates)
    #[serde(default)]
    pub extraction: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub emotional_tone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A question asked about an elder's memories, with its recorded answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub elder_id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    /// Ids of memories shown as "matched" (non-owning references)
    #[serde(default)]
    pub matched_memory_ids: Vec<i64>,
    pub created_at: String,
}

/// Narrative summary of one elder's day, one row per (elder, day)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: i64,
    pub elder_id: String,
    /// Calendar date, YYYY-MM-DD
    pub day: String,
    pub summary: String,
    pub memories_count: i64,
    pub created_at: String,
}

// ═══════════════════════════════════════
// API REQUEST / RESPONSE TYPES
// ═══════════════════════════════════════

/// Uniform JSON envelope for all REST responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Ask-question request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub elder_id: String,
    pub question: String,
}

/// Ask-question response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Display-only keyword matches (at most 5); NOT the grounding set
    pub matched_memories: Vec<Memory>,
    /// Whether the question/answer audit row was persisted
    pub recorded: bool,
}

/// Create-memory request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryRequest {
    pub elder_id: String,
    pub kind: String,
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub emotional_tone: Option<String>,
    #[serde(default)]
    pub extraction: Option<serde_json::Value>,
}

/// Pagination block returned by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

/// Paged memory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPage {
    pub data: Vec<Memory>,
    pub pagination: Pagination,
}

/// Generate-daily-summary request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSummaryRequest {
    pub elder_id: String,
    /// YYYY-MM-DD; defaults to the server-local current day
    #[serde(default)]
    pub date: Option<String>,
}

/// Generate-daily-summary response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub memories_count: i64,
}
