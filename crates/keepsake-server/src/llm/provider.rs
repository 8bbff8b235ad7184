// crates/keepsake-server/src/llm/provider.rs
// Completion backend abstraction - the seam where tests substitute fakes

use crate::error::Result;
use async_trait::async_trait;

/// A text-completion backend.
///
/// The pipelines (question answering, daily summaries) only ever talk to
/// this trait; the web state holds an `Arc<dyn CompletionBackend>` so the
/// hosted client can be swapped for a scripted fake in tests.
///
/// Implementations must perform exactly one attempt per call. Retrying is
/// a caller decision, never built in.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request and return the generated text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> String;
}
