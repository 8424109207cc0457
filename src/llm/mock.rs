use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Completion, LanguageModel, LlmError, TokenUsage};

/// A scripted model for tests. Returns pre-defined replies in order and
/// records the prompts it was given.
pub struct MockModel {
    replies: Vec<Result<Completion, LlmError>>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(replies: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `text`, reporting `tokens` output tokens.
    pub fn replying(text: &str, tokens: u64) -> Self {
        Self::new(vec![Ok(Completion {
            text: text.to_string(),
            usage: Some(TokenUsage {
                input_tokens: 0,
                output_tokens: tokens,
            }),
        })])
    }

    pub fn failing(err: LlmError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// User prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<Completion> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        // The last reply repeats once the script runs out.
        let reply = self
            .replies
            .get(i)
            .or_else(|| self.replies.last())
            .ok_or_else(|| anyhow::anyhow!("MockModel: no replies scripted"))?;
        reply.clone().map_err(anyhow::Error::new)
    }
}
