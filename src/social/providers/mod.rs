pub mod facebook;
pub mod instagram;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::channel::SocialChannel;
use super::types::ChannelResult;
use crate::config::ConfigSource;

/// Error code for a post attempted on a channel with no adapter.
pub const UNSUPPORTED: &str = "UNSUPPORTED";

/// Error code for missing provider credentials.
pub const AUTH: &str = "AUTH";

/// Publishes posts to one social channel.
///
/// `post` never fails: missing credentials, provider errors and the like
/// all come back as a failed [`ChannelResult`].
#[async_trait]
pub trait Provider: Send + Sync {
    fn channel(&self) -> SocialChannel;
    async fn post(&self, text: Option<&str>, media_urls: &[String]) -> ChannelResult;
}

/// The result for a channel whose credentials are not configured.
pub fn missing_credentials(channel: SocialChannel) -> ChannelResult {
    ChannelResult::failed(
        channel,
        AUTH,
        format!("Missing {} credentials", channel.display_name()),
    )
}

/// Fold the outcome of a publish step into a [`ChannelResult`].
/// `Ok` carries the provider-assigned post id.
pub fn settle(channel: SocialChannel, outcome: Result<String>) -> ChannelResult {
    match outcome {
        Ok(external_id) => ChannelResult::success(channel, external_id),
        Err(e) => {
            let mut message = format!("{e:#}");
            if message.trim().is_empty() {
                message = format!("Unknown {} error", channel.display_name());
            }
            ChannelResult::failed(channel, channel.error_code(), message)
        }
    }
}

/// Adapters keyed by channel. RwLock allows runtime registration + parallel reads.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<SocialChannel, Arc<dyn Provider>>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_providers(providers: Vec<Arc<dyn Provider>>) -> Self {
        let map = providers.into_iter().map(|p| (p.channel(), p)).collect();
        Self {
            providers: RwLock::new(map),
        }
    }

    /// The Facebook and Instagram adapters, reading credentials from `config`.
    pub fn with_builtin(config: Arc<dyn ConfigSource>) -> Self {
        Self::from_providers(vec![
            Arc::new(facebook::FacebookProvider::new(Arc::clone(&config))),
            Arc::new(instagram::InstagramProvider::new(config)),
        ])
    }

    /// Register an adapter, replacing any existing one for the same channel.
    pub async fn register(&self, provider: Arc<dyn Provider>) {
        let channel = provider.channel();
        self.providers.write().await.insert(channel, provider);
    }

    pub async fn unregister(&self, channel: SocialChannel) {
        self.providers.write().await.remove(&channel);
    }

    pub async fn get(&self, channel: SocialChannel) -> Option<Arc<dyn Provider>> {
        self.providers.read().await.get(&channel).cloned()
    }

    pub async fn channels(&self) -> Vec<SocialChannel> {
        let mut channels: Vec<_> = self.providers.read().await.keys().copied().collect();
        channels.sort();
        channels
    }

    /// Post through the adapter registered for `channel`.
    pub async fn post(
        &self,
        channel: SocialChannel,
        text: Option<&str>,
        media_urls: &[String],
    ) -> ChannelResult {
        // Clone the Arc out so the lock is not held across the provider call.
        match self.get(channel).await {
            Some(provider) => provider.post(text, media_urls).await,
            None => ChannelResult::failed(
                channel,
                UNSUPPORTED,
                format!("no provider registered for {channel}"),
            ),
        }
    }
}
