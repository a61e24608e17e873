//! Prompt-tap library - a logging reverse proxy for local model servers.

pub mod cli;
pub mod colors;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod middleware;
pub mod net;
pub mod proxy;
pub mod state;

use axum::{Router, middleware::from_fn_with_state};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the proxy router: every path falls through to the backend, with
/// request logging in front. `TraceLayer` spans are DEBUG level, visible with
/// `RUST_LOG=tower_http=debug`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::proxy_request)
        .layer(from_fn_with_state(state.clone(), middleware::log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
