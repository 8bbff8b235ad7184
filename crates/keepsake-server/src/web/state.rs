// src/web/state.rs
// Web server state management

use crate::db::DatabasePool;
use crate::error::{KeepsakeError, Result};
use crate::llm::CompletionBackend;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database pool
    pub pool: Arc<DatabasePool>,

    /// Completion backend; None when no API key is configured
    pub completion: Option<Arc<dyn CompletionBackend>>,
}

impl AppState {
    /// Create new application state
    pub fn new(pool: Arc<DatabasePool>, completion: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self { pool, completion }
    }

    /// Get the completion backend, failing fast with a configuration error
    /// when none is configured. Callers never reach the network without a
    /// credential.
    pub fn backend(&self) -> Result<&Arc<dyn CompletionBackend>> {
        self.completion.as_ref().ok_or_else(|| {
            KeepsakeError::Config(
                "no completion API key configured; set KEEPSAKE_API_KEY".into(),
            )
        })
    }
}
