//! Request logging middleware.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Local;
use nanoid::nanoid;
use std::{sync::Arc, time::Instant};
use tracing::{info, warn};

use crate::colors::colored_id;
use crate::format::{clock, compact_lines, verbose_lines};
use crate::state::AppState;

/// Short id tying a request's log lines to its response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Moment the middleware first saw the request; consumed by the response hook
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Middleware that logs each request before handing it on unchanged
///
/// This middleware:
/// 1. Records the start time and a short nanoid in the request extensions
/// 2. Buffers the body once (an unreadable body counts as empty)
/// 3. Logs either the extracted prompt or the full request, per `state.verbose`
/// 4. Re-attaches the same bytes as a fresh body for the next handler
pub async fn log_requests(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let id = nanoid!(5);
    let timestamp = clock(Local::now());

    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(RequestId(id.clone()));
    parts.extensions.insert(RequestStart(start));

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{} request body unreadable, forwarding empty: {}", colored_id(&id), e);
            Bytes::new()
        }
    };

    let lines = if state.verbose {
        verbose_lines(&parts.method, &parts.uri, &parts.headers, &body, &timestamp)
    } else {
        compact_lines(&body, &timestamp, state.prompt_field)
    };
    info!("{} {}", colored_id(&id), lines.join("\n"));

    next.run(Request::from_parts(parts, Body::from(body))).await
}
