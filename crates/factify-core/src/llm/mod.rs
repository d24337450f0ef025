//! Generation service client and types
//!
//! Talks to the Gemini `generateContent` REST API.

mod client;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::GeminiClient;
pub use types::*;

/// A text-generation backend
///
/// `with_search` asks the backend to ground its answer with its own web
/// search capability, when it has one.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, with_search: bool) -> Result<String>;
}
