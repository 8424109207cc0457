pub mod greeting;
pub mod mock;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Token usage from a single LLM call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One model answer.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Failures worth telling apart at the HTTP boundary. Models wrap these
/// in `anyhow::Error`; callers downcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("LLM is not configured: {0}")]
    NotConfigured(String),

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM rate limit exceeded")]
    RateLimited,

    #[error("No content received from LLM")]
    EmptyResponse,

    #[error("LLM generation failed: {0}")]
    Failed(String),
}

impl LlmError {
    /// Classify an error from a model call. Models report typed
    /// [`LlmError`]s; anything else is a plain generation failure.
    pub fn classify(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<LlmError>() {
            Some(known) => known.clone(),
            None => LlmError::Failed(format!("{err:#}")),
        }
    }
}

/// Something that turns a system + user prompt into text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs and responses.
    fn model(&self) -> &str;
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion>;
}
