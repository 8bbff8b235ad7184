// crates/keepsake-server/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default OpenAI-compatible chat completions endpoint
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Completion endpoint API key (KEEPSAKE_API_KEY or OPENAI_API_KEY)
    pub completion: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables (single source of truth)
    ///
    /// Set `KEEPSAKE_DISABLE_LLM=1` to suppress the completion key (forces
    /// every answer/summary call to fail fast with a configuration error)
    pub fn from_env() -> Self {
        if parse_bool_env("KEEPSAKE_DISABLE_LLM").unwrap_or(false) {
            info!("KEEPSAKE_DISABLE_LLM is set - completion client disabled");
            return Self { completion: None };
        }

        let completion =
            Self::read_key("KEEPSAKE_API_KEY").or_else(|| Self::read_key("OPENAI_API_KEY"));

        let keys = Self { completion };
        keys.log_status();
        keys
    }

    /// Read a single API key from environment, filtering empty values
    fn read_key(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|k| !k.trim().is_empty())
    }

    /// Check if the completion endpoint is usable
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Log which API keys are available (without exposing values)
    fn log_status(&self) {
        if self.completion.is_some() {
            debug!("Completion API key loaded");
        } else {
            warn!("No completion API key configured - question answering will be unavailable");
        }
    }
}

/// Completion endpoint configuration from environment variables
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Endpoint URL (KEEPSAKE_COMPLETION_URL)
    pub url: String,
    /// Model name (KEEPSAKE_MODEL)
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl CompletionConfig {
    /// Load completion configuration from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("KEEPSAKE_COMPLETION_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string());

        let model = std::env::var("KEEPSAKE_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self { url, model }
    }
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// API keys for the completion service
    pub api_keys: ApiKeys,
    /// Completion endpoint settings
    pub completion: CompletionConfig,
    /// Database path override (KEEPSAKE_DB_PATH)
    pub db_path: Option<PathBuf>,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");

        Self {
            api_keys: ApiKeys::from_env(),
            completion: CompletionConfig::from_env(),
            db_path: std::env::var("KEEPSAKE_DB_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !self.api_keys.has_completion() {
            validation.add_warning(
                "No completion API key configured. Set KEEPSAKE_API_KEY or OPENAI_API_KEY.",
            );
        }

        if !self.completion.url.starts_with("http") {
            validation.add_error(format!(
                "KEEPSAKE_COMPLETION_URL does not look like a URL: '{}'",
                self.completion.url
            ));
        }

        validation
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?.to_lowercase();
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_keys_default_empty() {
        // Default (empty) keys - no env manipulation needed
        let keys = ApiKeys::default();
        assert!(!keys.has_completion());
    }

    #[test]
    fn test_api_keys_with_value() {
        let keys = ApiKeys {
            completion: Some("test-key".to_string()),
        };
        assert!(keys.has_completion());
    }

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();
        assert_eq!(config.url, DEFAULT_COMPLETION_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_validation_no_key_warns_but_valid() {
        let config = EnvConfig {
            api_keys: ApiKeys::default(),
            completion: CompletionConfig::default(),
            db_path: None,
        };

        let validation = config.validate();
        assert!(validation.is_valid()); // Warnings don't make it invalid
        assert!(!validation.warnings.is_empty());
    }

    #[test]
    fn test_validation_bad_url_is_error() {
        let config = EnvConfig {
            api_keys: ApiKeys::default(),
            completion: CompletionConfig {
                url: "not a url".into(),
                model: DEFAULT_MODEL.into(),
            },
            db_path: None,
        };

        let validation = config.validate();
        assert!(!validation.is_valid());
        assert!(validation.report().contains("Errors:"));
    }
}
