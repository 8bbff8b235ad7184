// crates/keepsake-server/src/config/mod.rs
// Configuration layer - environment variables are the single source of truth

mod env;

pub use env::{ApiKeys, CompletionConfig, ConfigValidation, EnvConfig};
