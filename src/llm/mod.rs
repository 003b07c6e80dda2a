//! Text-generation provider abstraction.
//!
//! The ranker and the recipe generator only need "prompt in, text out", so
//! providers implement a single `complete` call. `GeminiProvider` talks to
//! Google's REST API; `FakeProvider` returns scripted replies for tests and
//! offline runs.

mod fake;
mod gemini;

pub use fake::FakeProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_code_fence_regex() -> &'static Regex {
    CODE_FENCE_REGEX.get_or_init(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").unwrap())
}

/// Error type for LLM operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited or quota exceeded: {0}")]
    RateLimited(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Failures worth one more attempt: the same prompt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RequestFailed(_) | LlmError::RateLimited(_) | LlmError::Timeout(_) => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::ParseError(_) | LlmError::NotConfigured(_) => false,
        }
    }
}

/// Pulls the outermost JSON value delimited by `open`/`close` out of a
/// model reply, looking inside a markdown code fence first.
pub fn extract_json(text: &str, open: char, close: char) -> Option<&str> {
    let body = get_code_fence_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    let start = body.find(open)?;
    let end = body.rfind(close)?;
    (end > start).then(|| &body[start..=end])
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe; one provider is shared by every
/// request in the process.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt and get the model's text response.
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String, LlmError>;

    /// Provider name (e.g. "gemini", "fake").
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}
