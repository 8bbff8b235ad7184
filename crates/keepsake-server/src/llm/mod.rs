// crates/keepsake-server/src/llm/mod.rs
// Completion endpoint client and prompt construction

mod client;
mod http_client;
pub mod prompt;
mod provider;
mod request;
mod response;

pub use client::CompletionClient;
pub use http_client::CompletionHttp;
pub use provider::CompletionBackend;
pub use request::{ChatRequest, Message};
pub use response::{ChatResponse, Usage, parse_answer_text};

/// Returned when the completion endpoint responds without usable text.
/// A malformed success response degrades to this instead of failing the request.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I could not generate an answer at this time.";
