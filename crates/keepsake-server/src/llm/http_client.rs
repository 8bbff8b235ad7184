// crates/keepsake-server/src/llm/http_client.rs
// HTTP transport for the completion endpoint
//
// One attempt per call. 429 and 402 map to distinct error variants so the
// REST boundary can pass them through verbatim; every other failure is a
// generic upstream error carrying the response body for diagnostics.

use crate::error::{KeepsakeError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

/// Default request timeout for completion calls
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default connect timeout
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// HTTP client for the completion endpoint
#[derive(Debug)]
pub struct CompletionHttp {
    client: Client,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl CompletionHttp {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
            connect_timeout,
        }
    }

    pub fn with_default_timeouts() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Execute one POST with Bearer auth and return the response body on success.
    ///
    /// Exactly one attempt: once this request is issued the operation runs to
    /// completion or to the endpoint's timeout. A failed call is returned to
    /// the caller, never silently retried.
    pub async fn execute_once(
        &self,
        request_id: &str,
        url: &str,
        api_key: &str,
        body: String,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                request_id = %request_id,
                status = %status,
                "Completion endpoint returned error"
            );
            return Err(match status.as_u16() {
                429 => KeepsakeError::RateLimited(error_body),
                402 => KeepsakeError::QuotaExhausted(error_body),
                code => KeepsakeError::Upstream {
                    status: code,
                    body: error_body,
                },
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CompletionHttp::new(Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(client.request_timeout, Duration::from_secs(10));
        assert_eq!(client.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_timeouts() {
        let client = CompletionHttp::with_default_timeouts();
        assert_eq!(
            client.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(
            client.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[tokio::test]
    async fn test_execute_once_connection_refused() {
        let client = CompletionHttp::new(
            Duration::from_millis(500),
            Duration::from_millis(200),
        );
        let result = client
            .execute_once("test", "http://127.0.0.1:1", "key", "{}".into())
            .await;
        assert!(result.is_err());
        // Transport failures surface as the reqwest passthrough variant (500-class)
        assert_eq!(result.unwrap_err().status_code(), 500);
    }
}
