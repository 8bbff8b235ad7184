// crates/keepsake-server/src/llm/client.rs
// Hosted completion endpoint client (OpenAI-compatible, non-streaming)

use crate::config::CompletionConfig;
use crate::error::{KeepsakeError, Result};
use crate::llm::http_client::CompletionHttp;
use crate::llm::provider::CompletionBackend;
use crate::llm::request::{ChatRequest, Message};
use crate::llm::response::parse_answer_text;
use crate::llm::FALLBACK_ANSWER;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Maximum output tokens for answers and summaries
const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Client for the hosted completion endpoint
#[derive(Debug)]
pub struct CompletionClient {
    api_key: String,
    url: String,
    model: String,
    http: CompletionHttp,
}

impl CompletionClient {
    /// Create a client. Fails with a configuration error when the key is
    /// missing or blank - this is checked here so no caller can reach the
    /// network without a credential.
    pub fn new(api_key: String, config: &CompletionConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(KeepsakeError::Config(
                "completion API key is not set".into(),
            ));
        }

        Ok(Self {
            api_key,
            url: config.url.clone(),
            model: config.model.clone(),
            http: CompletionHttp::with_default_timeouts(),
        })
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    #[instrument(skip(self, system, user), fields(request_id, model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let request = ChatRequest::new(
            self.model.clone(),
            vec![Message::system(system), Message::user(user)],
        )
        .with_max_tokens(MAX_COMPLETION_TOKENS);
        let body = serde_json::to_string(&request)?;

        let started = std::time::Instant::now();
        let response_body = self
            .http
            .execute_once(&request_id, &self.url, &self.api_key, body)
            .await?;

        let (content, usage) = parse_answer_text(&response_body)?;
        if let Some(u) = usage {
            debug!(
                request_id = %request_id,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                duration_ms = started.elapsed().as_millis() as u64,
                "Completion finished"
            );
        }

        Ok(content.unwrap_or_else(|| FALLBACK_ANSWER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompletionConfig {
        CompletionConfig {
            url: "http://127.0.0.1:1/v1/chat/completions".into(),
            model: "test-model".into(),
        }
    }

    #[test]
    fn test_new_with_key() {
        let client = CompletionClient::new("sk-test".into(), &config()).unwrap();
        assert_eq!(client.model_name(), "test-model");
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = CompletionClient::new("".into(), &config()).unwrap_err();
        assert!(matches!(err, KeepsakeError::Config(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let err = CompletionClient::new("   ".into(), &config()).unwrap_err();
        assert!(matches!(err, KeepsakeError::Config(_)));
    }
}
