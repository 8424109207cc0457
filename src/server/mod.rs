//! HTTP surface: routes, middleware and the listener.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::consts::MAX_BODY_BYTES;
use state::AppState;

fn social_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::social::create_post))
        .route("/posts/status", get(handlers::social::post_status))
}

/// Build the full router. `/api/*` sits behind the API-key check.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/social", social_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/hello", get(handlers::hello::hello))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.settings.host, state.settings.port);
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;

    tracing::info!(
        addr = %local,
        environment = %state.settings.app_env,
        auth_enabled = state.settings.api_key.is_some(),
        "server listening"
    );
    if state.settings.api_key.is_none() {
        tracing::warn!("API_KEY is not set; /api requests will fail");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
