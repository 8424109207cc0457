//! `/api/social` handlers: request validation at the boundary, then the
//! orchestrator.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use reqwest::Url;
use serde::Deserialize;

use crate::server::error::HttpError;
use crate::server::state::AppState;
use crate::social::{PostRequest, PostResponse, SocialChannel};

/// Every problem with `request`, in field order. Empty means valid.
pub fn validate(request: &PostRequest) -> Vec<String> {
    let mut problems = Vec::new();

    for url in request.media() {
        if Url::parse(url).is_err() {
            problems.push(format!("Invalid url: {url}"));
        }
    }

    for channel in request.channels.as_deref().unwrap_or(&[]) {
        if channel.parse::<SocialChannel>().is_err() {
            problems.push(format!("Invalid channel: {channel}"));
        }
    }

    if request.idempotency_key.as_deref().is_some_and(str::is_empty) {
        problems.push("idempotencyKey must not be empty".to_string());
    }

    if !request.has_content() {
        problems.push("Either text or mediaUrls is required".to_string());
    }

    problems
}

pub async fn create_post(
    State(state): State<AppState>,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, HttpError> {
    let Json(request) = body.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => HttpError::PayloadTooLarge,
        _ => HttpError::Validation(vec![e.body_text()]),
    })?;

    let problems = validate(&request);
    if !problems.is_empty() {
        tracing::debug!(?problems, "rejecting invalid post");
        return Err(HttpError::Validation(problems));
    }

    Ok(Json(state.orchestrator.submit(request).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: Option<String>,
}

pub async fn post_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<PostResponse>, HttpError> {
    let key = query
        .idempotency_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| HttpError::BadRequest("idempotencyKey is required".to_string()))?;

    state
        .orchestrator
        .get_status(&key)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound)
}
