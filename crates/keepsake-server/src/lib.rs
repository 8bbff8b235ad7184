// crates/keepsake-server/src/lib.rs
// Keepsake - Memory companion backend for elder care

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod qa;
pub mod recall;
pub mod summarize;
pub mod web;

pub use error::{KeepsakeError, Result};
