//! Composition root: the only place concrete stores, providers and models
//! are chosen.

use anyhow::Result;
use std::sync::Arc;

use crate::config::{ConfigSource, Settings};
use crate::llm::greeting::GreetingService;
use crate::llm::openai::OpenAiModel;
use crate::server::state::{AppContext, AppState};
use crate::social::store::memory::InMemoryStore;
use crate::social::store::sqlite::SqliteStore;
use crate::social::{IdempotencyStore, OrchestratorConfig, PostOrchestrator, ProviderRegistry};

/// SQLite when a path is configured, otherwise a process-lifetime map.
pub fn build_store(settings: &Settings) -> Result<Arc<dyn IdempotencyStore>> {
    match settings.idempotency_db.as_deref() {
        Some(path) => {
            tracing::info!(path, "using SQLite idempotency store");
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        None => {
            tracing::info!("using in-memory idempotency store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

pub fn build_orchestrator(
    settings: &Settings,
    config: Arc<dyn ConfigSource>,
) -> Result<PostOrchestrator> {
    let providers = Arc::new(ProviderRegistry::with_builtin(config));
    let store = build_store(settings)?;
    Ok(PostOrchestrator::new(
        providers,
        store,
        OrchestratorConfig {
            default_channels: settings.default_channels.clone(),
            channel_timeout: settings.channel_timeout,
        },
    ))
}

pub fn build_greeting(settings: &Settings) -> Result<GreetingService> {
    if settings.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; /hello will return 503");
    }
    let model = OpenAiModel::new(settings.llm.clone())?;
    Ok(GreetingService::new(Arc::new(model)))
}

pub fn bootstrap(settings: Settings, config: Arc<dyn ConfigSource>) -> Result<AppState> {
    let orchestrator = Arc::new(build_orchestrator(&settings, config)?);
    let greeting = Arc::new(build_greeting(&settings)?);
    Ok(Arc::new(AppContext::new(orchestrator, greeting, settings)))
}
