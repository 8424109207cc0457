use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;

use super::{Completion, LanguageModel, LlmError, TokenUsage};

/// A model that calls an OpenAI-compatible chat completions endpoint.
pub struct OpenAiModel {
    client: reqwest::Client,
    settings: LlmSettings,
}

impl OpenAiModel {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("failed to build HTTP client for LLM")?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, system: &'a str, prompt: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }

    fn parse_response(resp: ApiResponse) -> Result<Completion> {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            bail!(LlmError::EmptyResponse);
        }

        let usage = resp.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(Completion { text, usage })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            bail!(LlmError::NotConfigured("OPENAI_API_KEY is not set".to_string()));
        };

        let body = self.build_request(system, prompt);
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::Error::new(LlmError::Timeout)
                } else {
                    anyhow::Error::new(LlmError::Failed(e.to_string()))
                }
            })?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            bail!(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!(LlmError::Failed(format!("OpenAI API error ({status}): {text}")));
        }

        let api_resp: ApiResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                anyhow::Error::new(LlmError::Timeout)
            } else {
                anyhow::Error::new(LlmError::Failed(format!("malformed response: {e}")))
            }
        })?;

        let completion = Self::parse_response(api_resp)?;
        if let Some(usage) = completion.usage {
            tracing::debug!(
                model = %self.settings.model,
                input = usage.input_tokens,
                output = usage.output_tokens,
                "llm tokens"
            );
        }
        Ok(completion)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
