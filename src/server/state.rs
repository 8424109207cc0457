//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::llm::greeting::GreetingService;
use crate::social::PostOrchestrator;

/// Services every handler may reach.
pub struct AppContext {
    pub orchestrator: Arc<PostOrchestrator>,
    pub greeting: Arc<GreetingService>,
    pub settings: Settings,
    pub started: Instant,
}

impl AppContext {
    pub fn new(
        orchestrator: Arc<PostOrchestrator>,
        greeting: Arc<GreetingService>,
        settings: Settings,
    ) -> Self {
        Self {
            orchestrator,
            greeting,
            settings,
            started: Instant::now(),
        }
    }
}

pub type AppState = Arc<AppContext>;
