//! Process configuration.
//!
//! Every value is read through a [`ConfigSource`]. The binary uses
//! [`EnvSource`] (the process environment, optionally seeded from `.env`);
//! tests hand in a [`MapSource`] so they never mutate global state.
//! Provider adapters keep a source around and read credentials on each call.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::consts::{
    DEFAULT_APP_ENV, DEFAULT_HOST, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MAX_TOKENS,
    DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_LOG_LEVEL,
    DEFAULT_PORT,
};

/// Environment variable names.
pub mod keys {
    pub const PORT: &str = "PORT";
    pub const HOST: &str = "HOST";
    pub const APP_ENV: &str = "APP_ENV";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const API_KEY: &str = "API_KEY";
    pub const SOCIAL_DEFAULT_CHANNELS: &str = "SOCIAL_DEFAULT_CHANNELS";
    pub const SOCIAL_CHANNEL_TIMEOUT_MS: &str = "SOCIAL_CHANNEL_TIMEOUT_MS";
    pub const IDEMPOTENCY_DB: &str = "IDEMPOTENCY_DB";

    pub const FACEBOOK_PAGE_ID: &str = "FACEBOOK_PAGE_ID";
    pub const FACEBOOK_PAGE_ACCESS_TOKEN: &str = "FACEBOOK_PAGE_ACCESS_TOKEN";
    pub const IG_USER_ID: &str = "IG_USER_ID";
    pub const IG_LONG_LIVED_ACCESS_TOKEN: &str = "IG_LONG_LIVED_ACCESS_TOKEN";

    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const OPENAI_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
    pub const OPENAI_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
}

/// A read-only key/value view of configuration.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Like [`get`](Self::get), but blank values count as absent.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed map of values. Used by tests and the one-shot CLI commands.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Settings for the LLM greeting call.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// `None` is not a start-up error; the greeting endpoint reports it.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

/// Everything the server needs at start-up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub app_env: String,
    pub log_level: String,
    pub api_key: Option<String>,
    /// Raw channel names; resolved against the registry per request.
    pub default_channels: Vec<String>,
    /// Per-channel deadline for provider calls. `None` waits forever.
    pub channel_timeout: Option<Duration>,
    /// SQLite path for the idempotency store. `None` keeps it in memory.
    pub idempotency_db: Option<String>,
    pub llm: LlmSettings,
}

impl Settings {
    pub fn load(source: &dyn ConfigSource) -> Result<Self> {
        let channel_timeout = source
            .non_empty(keys::SOCIAL_CHANNEL_TIMEOUT_MS)
            .map(|raw| parse_value::<u64>(keys::SOCIAL_CHANNEL_TIMEOUT_MS, &raw))
            .transpose()?
            .map(Duration::from_millis);

        let llm = LlmSettings {
            api_key: source.non_empty(keys::OPENAI_API_KEY),
            model: source
                .non_empty(keys::OPENAI_MODEL)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            base_url: source
                .non_empty(keys::OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            temperature: parse_or(source, keys::OPENAI_TEMPERATURE, DEFAULT_LLM_TEMPERATURE)?,
            max_tokens: parse_or(source, keys::OPENAI_MAX_TOKENS, DEFAULT_LLM_MAX_TOKENS)?,
            ..LlmSettings::default()
        };

        Ok(Self {
            host: source
                .non_empty(keys::HOST)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(source, keys::PORT, DEFAULT_PORT)?,
            app_env: source
                .non_empty(keys::APP_ENV)
                .unwrap_or_else(|| DEFAULT_APP_ENV.to_string()),
            log_level: source
                .non_empty(keys::LOG_LEVEL)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            api_key: source.non_empty(keys::API_KEY),
            default_channels: parse_channel_list(
                &source.get(keys::SOCIAL_DEFAULT_CHANNELS).unwrap_or_default(),
            ),
            channel_timeout,
            idempotency_db: source.non_empty(keys::IDEMPOTENCY_DB),
            llm,
        })
    }
}

/// Split a comma-separated channel list, dropping blank entries.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(source: &dyn ConfigSource, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match source.non_empty(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("invalid value for {key}: {raw:?} ({e})"))
}
