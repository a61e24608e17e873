//! HTTP request handlers.

use axum::{body::Body, extract::State, http::Request, response::Response};
use std::sync::Arc;

use crate::state::AppState;

/// Forwards any request to the backend; mounted as the router's fallback
pub async fn proxy_request(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    state.proxy.forward(req).await
}
