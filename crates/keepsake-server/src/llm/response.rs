// crates/keepsake-server/src/llm/response.rs
// OpenAI-compatible chat response parsing

use crate::error::{KeepsakeError, Result};
use serde::Deserialize;

/// Token usage block
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Non-streaming chat response (OpenAI-compatible format)
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Extract the first completion's text from a response body.
///
/// Returns `Ok(None)` when the body parses but lacks the expected content
/// field - the caller substitutes a fixed fallback string rather than
/// failing the request. A body that is not valid JSON at all is an error.
pub fn parse_answer_text(response_body: &str) -> Result<(Option<String>, Option<Usage>)> {
    let data: ChatResponse = serde_json::from_str(response_body).map_err(|e| {
        KeepsakeError::Upstream {
            status: 200,
            body: format!("unparseable completion response: {e}"),
        }
    })?;

    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|s| !s.trim().is_empty());

    Ok((content, data.usage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_response() {
        let json = r#"{
            "choices": [{
                "message": {
                    "content": "You went to the lake."
                }
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        }"#;

        let (content, usage) = parse_answer_text(json).unwrap();
        assert_eq!(content.as_deref(), Some("You went to the lake."));
        assert_eq!(usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_missing_content_is_none() {
        let json = r#"{"choices": [{"message": {}}]}"#;
        let (content, _) = parse_answer_text(json).unwrap();
        assert!(content.is_none());
    }

    #[test]
    fn test_parse_empty_choices_is_none() {
        let json = r#"{"choices": []}"#;
        let (content, _) = parse_answer_text(json).unwrap();
        assert!(content.is_none());
    }

    #[test]
    fn test_parse_blank_content_is_none() {
        let json = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let (content, _) = parse_answer_text(json).unwrap();
        assert!(content.is_none());
    }

    #[test]
    fn test_parse_invalid_json_is_error() {
        let result = parse_answer_text("<html>gateway error</html>");
        assert!(result.is_err());
    }
}
