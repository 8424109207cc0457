//! Fans one post out to every targeted channel and folds the per-channel
//! results into a single response.
//!
//! Flow for [`PostOrchestrator::submit`]:
//! 1. Reject requests with neither text nor media (nothing attempted).
//! 2. With an idempotency key: serialize on that key, replay a stored
//!    response if there is one.
//! 3. Resolve channels, spawn one task per channel, wait for all of them.
//! 4. Aggregate, store under the key (first writer wins), return.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

use super::channel::{SocialChannel, resolve_channels};
use super::providers::ProviderRegistry;
use super::store::IdempotencyStore;
use super::types::{ChannelResult, PostRequest, PostResponse};

/// Error code for a channel that missed its deadline.
pub const TIMEOUT: &str = "TIMEOUT";

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Channel names used when a request names none.
    pub default_channels: Vec<String>,
    /// Deadline for each provider call. `None` waits indefinitely, so a
    /// provider that never answers stalls the whole request.
    pub channel_timeout: Option<Duration>,
}

/// Wires together the provider registry and the idempotency store.
pub struct PostOrchestrator {
    shared: Arc<Shared>,
}

struct Shared {
    providers: Arc<ProviderRegistry>,
    store: Arc<dyn IdempotencyStore>,
    config: OrchestratorConfig,
    key_locks: KeyLocks,
}

impl PostOrchestrator {
    pub fn new(
        providers: Arc<ProviderRegistry>,
        store: Arc<dyn IdempotencyStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                providers,
                store,
                config,
                key_locks: KeyLocks::default(),
            }),
        }
    }

    /// Publish `request` to its channels. Per-channel failures are part of
    /// the returned response; only store errors surface as `Err`.
    ///
    /// A keyed submission runs to completion on its own task, so dropping
    /// the returned future still stores the response under the key.
    pub async fn submit(&self, request: PostRequest) -> Result<PostResponse> {
        if !request.has_content() {
            tracing::warn!("rejecting post with neither text nor media");
            return Ok(PostResponse::rejected());
        }

        let Some(key) = request.idempotency_key.clone() else {
            return Ok(self.shared.fan_out(&request, None).await);
        };

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            // Held until the response is stored, so identical keys never
            // fan out twice.
            let _guard = shared.key_locks.acquire(&key).await;
            shared.submit_keyed(&key, &request).await
        })
        .await
        .map_err(|e| anyhow!("keyed post task failed: {e}"))?
    }

    /// The stored response for `key`, if any.
    pub async fn get_status(&self, key: &str) -> Result<Option<PostResponse>> {
        self.shared.store.get(key).await
    }
}

impl Shared {
    async fn submit_keyed(&self, key: &str, request: &PostRequest) -> Result<PostResponse> {
        if let Some(existing) = self.store.get(key).await? {
            tracing::info!(idempotency_key = %key, "replaying stored post response");
            return Ok(existing);
        }

        let response = self.fan_out(request, Some(key.to_string())).await;
        self.store.insert_if_absent(key, response).await
    }

    async fn fan_out(&self, request: &PostRequest, correlation_id: Option<String>) -> PostResponse {
        let channels = resolve_channels(request.channels.as_deref(), &self.config.default_channels);
        let media: Arc<[String]> = Arc::from(request.media());

        tracing::debug!(
            channels = ?channels,
            media = media.len(),
            has_metadata = request.metadata.is_some(),
            "fanning out post"
        );

        let handles: Vec<_> = channels
            .into_iter()
            .map(|channel| {
                let providers = Arc::clone(&self.providers);
                let text = request.text.clone();
                let media = Arc::clone(&media);
                let timeout = self.config.channel_timeout;
                let handle = tokio::spawn(async move {
                    post_one(&providers, channel, text.as_deref(), &media, timeout).await
                });
                (channel, handle)
            })
            .collect();

        let results = futures::future::join_all(handles.into_iter().map(
            |(channel, handle)| async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(%channel, error = %e, "provider task aborted");
                        ChannelResult::failed(
                            channel,
                            channel.error_code(),
                            format!("{} provider task failed: {e}", channel.display_name()),
                        )
                    }
                }
            },
        ))
        .await;

        for result in &results {
            match &result.error_code {
                None => tracing::info!(channel = %result.channel, "✓ posted"),
                Some(code) => tracing::warn!(
                    channel = %result.channel,
                    code = %code,
                    message = result.error_message.as_deref().unwrap_or(""),
                    "✗ post failed"
                ),
            }
        }

        let response = PostResponse::from_results(results, correlation_id);
        tracing::info!(
            overall = ?response.overall_status,
            channels = response.results.len(),
            "post aggregated"
        );
        response
    }
}

async fn post_one(
    providers: &ProviderRegistry,
    channel: SocialChannel,
    text: Option<&str>,
    media_urls: &[String],
    timeout: Option<Duration>,
) -> ChannelResult {
    let call = providers.post(channel, text, media_urls);
    let Some(limit) = timeout else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => ChannelResult::failed(
            channel,
            TIMEOUT,
            format!(
                "{} did not respond within {}ms",
                channel.display_name(),
                limit.as_millis()
            ),
        ),
    }
}

/// One async mutex per in-flight idempotency key.
///
/// Each entry counts the submissions holding or waiting on it and is
/// removed when the last of them lets go, cancelled waiters included.
#[derive(Default)]
struct KeyLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

#[derive(Default)]
struct Slot {
    mutex: Arc<tokio::sync::Mutex<()>>,
    users: usize,
}

impl KeyLocks {
    async fn acquire(&self, key: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(key.to_string()).or_default();
            slot.users += 1;
            Arc::clone(&slot.mutex)
        };
        // Registered before waiting, so dropping this future mid-wait
        // still gives the slot back.
        let mut guard = KeyGuard {
            locks: self,
            key: key.to_string(),
            held: None,
        };
        guard.held = Some(mutex.lock_owned().await);
        guard
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// A claim on one key's mutex, held or still waiting.
struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        let mut slots = self.locks.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}
