use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::time::Instant;

use super::timestamp;
use crate::server::error::HttpError;
use crate::server::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloMetadata {
    /// Milliseconds spent producing the greeting.
    pub processing_time: u64,
    pub tokens_used: u64,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub metadata: HelloMetadata,
}

/// AI-generated welcome message.
pub async fn hello(State(state): State<AppState>) -> Result<Json<HelloResponse>, HttpError> {
    let start = Instant::now();
    let greeting = state.greeting.generate().await?;
    let processing_time = start.elapsed().as_millis() as u64;

    tracing::info!(
        processing_time,
        tokens_used = greeting.tokens_used,
        "hello request completed"
    );

    Ok(Json(HelloResponse {
        message: greeting.message,
        metadata: HelloMetadata {
            processing_time,
            tokens_used: greeting.tokens_used,
            timestamp: timestamp(),
        },
    }))
}
