//! The AI welcome message served by `GET /hello`.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

use super::{LanguageModel, LlmError};

const SYSTEM_PROMPT: &str = "You are a friendly AI assistant for Marlin Marketing Agent. \
Generate warm, professional welcome messages.";

const GREETING_INSTRUCTIONS: &str = "You are a friendly AI assistant for Marlin Marketing Agent. \
Generate a warm welcome message that includes the current time and day.

Requirements:
1. Write a friendly, professional welcome message
2. Include the current date and time in a natural way
3. Keep it concise but engaging (2-3 sentences)
4. Use a warm, welcoming tone
5. Mention that this is from the Marlin Marketing Agent

Return the response as a simple text message (not JSON).";

/// Render the greeting prompt for a given wall-clock time.
pub fn greeting_prompt(now: NaiveDateTime) -> String {
    format!(
        "{GREETING_INSTRUCTIONS}\n\nCurrent time: {}\nCurrent date: {}",
        now.format("%-I:%M %p"),
        now.format("%A, %B %-d, %Y"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub message: String,
    pub tokens_used: u64,
}

pub struct GreetingService {
    model: Arc<dyn LanguageModel>,
}

impl GreetingService {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Generate a greeting stamped with the local time.
    pub async fn generate(&self) -> Result<Greeting, LlmError> {
        self.generate_at(Local::now().naive_local()).await
    }

    pub async fn generate_at(&self, now: NaiveDateTime) -> Result<Greeting, LlmError> {
        tracing::info!(model = %self.model.model(), "generating greeting");

        let prompt = greeting_prompt(now);
        let completion = match self.model.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(c) => c,
            Err(e) => {
                let err = LlmError::classify(&e);
                tracing::error!(model = %self.model.model(), error = %err, "greeting failed");
                return Err(err);
            }
        };

        let message = completion.text.trim();
        if message.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        let tokens_used = completion.usage.map(|u| u.total()).unwrap_or(0);

        tracing::info!(tokens_used, length = message.len(), "greeting generated");
        Ok(Greeting {
            message: message.to_string(),
            tokens_used,
        })
    }
}
