pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use super::types::PostResponse;

/// Where aggregate results are remembered by idempotency key.
/// Could be in-memory, SQLite, or an external cache.
///
/// Entries are written once and never updated; there is no expiry.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<PostResponse>>;

    /// Atomically store `response` under `key` unless the key is taken.
    /// Returns the response that is stored once the call completes: the
    /// given one if this call won, otherwise the earlier writer's.
    async fn insert_if_absent(&self, key: &str, response: PostResponse) -> Result<PostResponse>;

    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
