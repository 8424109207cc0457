use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Provider;
use crate::social::channel::SocialChannel;
use crate::social::types::ChannelResult;

#[derive(Debug, Clone)]
enum Behavior {
    Succeed(String),
    Fail { code: String, message: String },
    /// Never settles.
    Hang,
    Panic,
}

/// A scripted provider for tests. Counts calls and can be shared between
/// the registry and the test through an `Arc`.
pub struct MockProvider {
    channel: SocialChannel,
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn succeeding(channel: SocialChannel, external_id: &str) -> Arc<Self> {
        Self::build(channel, Behavior::Succeed(external_id.to_string()))
    }

    pub fn failing(channel: SocialChannel, code: &str, message: &str) -> Arc<Self> {
        Self::build(
            channel,
            Behavior::Fail {
                code: code.to_string(),
                message: message.to_string(),
            },
        )
    }

    pub fn hanging(channel: SocialChannel) -> Arc<Self> {
        Self::build(channel, Behavior::Hang)
    }

    pub fn panicking(channel: SocialChannel) -> Arc<Self> {
        Self::build(channel, Behavior::Panic)
    }

    /// Sleep before answering, to widen race windows in tests.
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            channel: self.channel,
            behavior: self.behavior.clone(),
            delay: Some(delay),
            calls: AtomicUsize::new(self.calls()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn build(channel: SocialChannel, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            channel,
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn channel(&self) -> SocialChannel {
        self.channel
    }

    async fn post(&self, _text: Option<&str>, _media_urls: &[String]) -> ChannelResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Succeed(id) => ChannelResult::success(self.channel, id.clone()),
            Behavior::Fail { code, message } => {
                ChannelResult::failed(self.channel, code.clone(), message.clone())
            }
            Behavior::Hang => std::future::pending().await,
            Behavior::Panic => panic!("MockProvider: scripted panic for {}", self.channel),
        }
    }
}
