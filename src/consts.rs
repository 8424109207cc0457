//! Project-wide constants.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Name reported by the root endpoint and used in LLM prompts.
pub const SERVICE_NAME: &str = "Marlin Marketing Agent";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum accepted JSON request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default OpenAI chat model when none is specified.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
