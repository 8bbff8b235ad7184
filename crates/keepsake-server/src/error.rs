// crates/keepsake-server/src/error.rs
// Standardized error types for Keepsake

use thiserror::Error;

/// Main error type for the Keepsake library
#[derive(Error, Debug)]
pub enum KeepsakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("rate limited by completion service: {0}")]
    RateLimited(String),

    #[error("completion service quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("completion service error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using KeepsakeError
pub type Result<T> = std::result::Result<T, KeepsakeError>;

impl KeepsakeError {
    /// HTTP status this error surfaces as at the REST boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::QuotaExhausted(_) => 402,
            Self::RateLimited(_) => 429,
            _ => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Validation errors and the forwarded rate-limit/quota messages are
    /// user-facing; everything else is logged server-side and replaced
    /// with a generic message.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => format!("invalid input: {msg}"),
            Self::RateLimited(msg) => {
                format!("the answer service is busy, try again shortly: {msg}")
            }
            Self::QuotaExhausted(msg) => {
                format!("the answer service quota is exhausted: {msg}")
            }
            _ => "internal error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Status mapping tests
    // ============================================================================

    #[test]
    fn test_invalid_input_is_400() {
        let err = KeepsakeError::InvalidInput("question too long".into());
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("invalid input"));
    }

    #[test]
    fn test_rate_limited_is_429() {
        let err = KeepsakeError::RateLimited("slow down".into());
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn test_quota_exhausted_is_402() {
        let err = KeepsakeError::QuotaExhausted("credits spent".into());
        assert_eq!(err.status_code(), 402);
    }

    #[test]
    fn test_upstream_is_500() {
        let err = KeepsakeError::Upstream {
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }

    #[test]
    fn test_storage_is_500() {
        let err = KeepsakeError::Storage("connection pool exhausted".into());
        assert_eq!(err.status_code(), 500);
    }

    // ============================================================================
    // Client message tests
    // ============================================================================

    #[test]
    fn test_client_message_forwards_validation() {
        let err = KeepsakeError::InvalidInput("elder_id is required".into());
        assert!(err.client_message().contains("elder_id is required"));
    }

    #[test]
    fn test_client_message_forwards_rate_limit_detail() {
        let err = KeepsakeError::RateLimited("retry after 20s".into());
        assert!(err.client_message().contains("retry after 20s"));
    }

    #[test]
    fn test_client_message_hides_internal_detail() {
        let err = KeepsakeError::Storage("/var/lib/keepsake.db is corrupt".into());
        assert_eq!(err.client_message(), "internal error");

        let err = KeepsakeError::Upstream {
            status: 500,
            body: "stack trace".into(),
        };
        assert_eq!(err.client_message(), "internal error");
    }
}
