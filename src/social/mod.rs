//! Multi-channel social posting: channel resolution, provider adapters,
//! the idempotency store and the orchestrator that ties them together.

pub mod channel;
pub mod orchestrator;
pub mod providers;
pub mod store;
pub mod types;

pub use channel::{SocialChannel, resolve_channels};
pub use orchestrator::{OrchestratorConfig, PostOrchestrator};
pub use providers::{Provider, ProviderRegistry};
pub use store::IdempotencyStore;
pub use types::{ChannelResult, ChannelStatus, OverallStatus, PostRequest, PostResponse};
