//! Service metadata endpoints. Unauthenticated.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::timestamp;
use crate::consts::{SERVICE_NAME, VERSION};
use crate::server::state::AppState;

#[derive(Serialize)]
pub struct Endpoints {
    pub hello: &'static str,
    pub health: &'static str,
    pub posts: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    /// Seconds since the server started.
    pub uptime: f64,
    pub environment: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{SERVICE_NAME} API"),
        version: VERSION,
        endpoints: Endpoints {
            hello: "/hello",
            health: "/health",
            posts: "/api/social/posts",
            status: "/api/social/posts/status",
        },
        timestamp: timestamp(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp(),
        version: VERSION,
        uptime: state.started.elapsed().as_secs_f64(),
        environment: state.settings.app_env.clone(),
    })
}
