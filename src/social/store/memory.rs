use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

use super::IdempotencyStore;
use crate::social::types::PostResponse;

/// Process-lifetime store. Lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, PostResponse>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<PostResponse>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn insert_if_absent(&self, key: &str, response: PostResponse) -> Result<PostResponse> {
        let mut entries = self.entries.write().await;
        let stored = match entries.entry(key.to_string()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(response).clone(),
        };
        Ok(stored)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
