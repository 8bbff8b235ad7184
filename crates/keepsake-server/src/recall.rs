// crates/keepsake-server/src/recall.rs
// Retrieval filter: bounded recent window plus display-only keyword matching
//
// Two independent selections on purpose. The full recent window (newest 50)
// is what grounds the completion call; the keyword matches are a small
// audit/display list and never gate what the model sees.

use crate::db::{self, DatabasePool};
use crate::error::{KeepsakeError, Result};
use keepsake_types::Memory;

/// Size of the bounded recent window sent to the completion endpoint
pub const RECENT_WINDOW: usize = 50;
/// Maximum entries in the display-only matched list
pub const MATCH_CAP: usize = 5;
/// Question length bounds, after trimming
pub const QUESTION_MAX_CHARS: usize = 500;

/// Keyword tokens must be strictly longer than this many characters
const MIN_TOKEN_CHARS: usize = 3;

/// Validate and trim an elder identifier.
pub fn validate_elder_id(elder_id: &str) -> Result<String> {
    let trimmed = elder_id.trim();
    if trimmed.is_empty() {
        return Err(KeepsakeError::InvalidInput("elder_id is required".into()));
    }
    Ok(trimmed.to_string())
}

/// Validate and trim a question: 1-500 characters after trimming.
pub fn validate_question(question: &str) -> Result<String> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(KeepsakeError::InvalidInput("question is required".into()));
    }
    if trimmed.chars().count() > QUESTION_MAX_CHARS {
        return Err(KeepsakeError::InvalidInput(format!(
            "question must be at most {QUESTION_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Load the bounded recent window for an elder. A storage failure here
/// aborts the whole ask operation - there is no partial answer.
pub async fn fetch_recent_window(pool: &DatabasePool, elder_id: &str) -> Result<Vec<Memory>> {
    let elder_id = elder_id.to_string();
    pool.interact(move |conn| db::recent_window(conn, &elder_id, RECENT_WINDOW))
        .await
        .map_err(|e| KeepsakeError::Storage(format!("memory window fetch failed: {e}")))
}

/// Compute the display-only matched subset by substring containment.
///
/// Tokens are lowercase question words longer than 3 characters; a memory
/// matches when its lowercased body contains any token. Capped at
/// [`MATCH_CAP`] entries, preserving the window's newest-first order.
pub fn keyword_matches(question: &str, window: &[Memory]) -> Vec<Memory> {
    let tokens: Vec<String> = question
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| w.chars().count() > MIN_TOKEN_CHARS)
        .collect();

    if tokens.is_empty() {
        return Vec::new();
    }

    window
        .iter()
        .filter(|m| {
            let body = m.body.to_lowercase();
            tokens.iter().any(|t| body.contains(t.as_str()))
        })
        .take(MATCH_CAP)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_types::MemoryKind;

    fn memory(id: i64, body: &str) -> Memory {
        Memory {
            id,
            elder_id: "e1".into(),
            kind: MemoryKind::Story,
            body: body.into(),
            image_url: None,
            extraction: None,
            tags: vec![],
            emotional_tone: None,
            created_at: "2026-08-27 09:00:00".into(),
            updated_at: "2026-08-27 09:00:00".into(),
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_validate_elder_id() {
        assert_eq!(validate_elder_id("  elder-1  ").unwrap(), "elder-1");
        assert!(validate_elder_id("").is_err());
        assert!(validate_elder_id("   ").is_err());
    }

    #[test]
    fn test_validate_question_bounds() {
        assert_eq!(validate_question(" hi? ").unwrap(), "hi?");
        assert!(validate_question("").is_err());
        assert!(validate_question("   ").is_err());

        let exactly_max = "x".repeat(QUESTION_MAX_CHARS);
        assert!(validate_question(&exactly_max).is_ok());
        let too_long = "x".repeat(QUESTION_MAX_CHARS + 1);
        let err = validate_question(&too_long).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_validate_question_trims_before_measuring() {
        let padded = format!("  {}  ", "x".repeat(QUESTION_MAX_CHARS));
        assert!(validate_question(&padded).is_ok());
    }

    // ========================================================================
    // Keyword matching
    // ========================================================================

    #[test]
    fn test_short_tokens_ignored() {
        // "who" and "is" are <= 3 chars; only "anna" counts
        let window = vec![memory(1, "Anna is my granddaughter"), memory(2, "The cat is grey")];
        let matches = keyword_matches("Who is Anna?", &window);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let window = vec![memory(1, "We visited the LAKE on Sunday")];
        let matches = keyword_matches("what happened at the lake", &window);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_punctuation_stripped_from_tokens() {
        let window = vec![memory(1, "Her birthday is in June")];
        let matches = keyword_matches("When is her birthday?", &window);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_match_cap() {
        let window: Vec<Memory> = (0..10)
            .map(|i| memory(i, &format!("garden visit number {i}")))
            .collect();
        let matches = keyword_matches("Tell me about the garden", &window);
        assert_eq!(matches.len(), MATCH_CAP);
        // Window order preserved
        assert_eq!(matches[0].id, 0);
    }

    #[test]
    fn test_no_long_tokens_means_no_matches() {
        let window = vec![memory(1, "We ate soup")];
        assert!(keyword_matches("is it so?", &window).is_empty());
    }

    #[test]
    fn test_no_matching_memories() {
        let window = vec![memory(1, "We played chess")];
        assert!(keyword_matches("Tell me about the garden", &window).is_empty());
    }
}
