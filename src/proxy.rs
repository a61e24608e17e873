//! Single-host reverse proxy.
//!
//! [`ReverseProxy`] rewrites each request onto the backend's scheme, host and
//! port (the "director"), dispatches it with a shared `reqwest` client, logs
//! the backend's status line with the request's latency, and streams the
//! response back untouched.

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{
        HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri,
        header::{CONNECTION, CONTENT_LENGTH, HOST},
    },
    response::{IntoResponse, Response},
};
use reqwest::redirect::Policy;
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tracing::{error, info, warn};
use url::Url;

use crate::colors::colored_id;
use crate::error::{ConfigError, Result};
use crate::format::response_line;
use crate::middleware::{RequestId, RequestStart};

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Forwards requests to one backend.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    target: Url,
    client: reqwest::Client,
}

impl ReverseProxy {
    /// Validates `backend` and builds the forwarding client.
    ///
    /// This is the only place startup can fail: a malformed URL, a scheme
    /// other than http/https, or a URL without a host is rejected here.
    pub fn new(backend: &str) -> Result<Self> {
        let target = parse_backend(backend)?;
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { target, client })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Rewrites an inbound URI onto the backend.
    ///
    /// Scheme, host and port come from the backend; the inbound path is
    /// appended to the backend's base path and the inbound query is kept.
    pub fn director(&self, uri: &Uri) -> Url {
        let mut url = self.target.clone();
        url.set_path(&join_paths(self.target.path(), uri.path()));
        url.set_query(uri.query());
        url
    }

    /// Sends `req` to the backend and returns its response.
    ///
    /// Transport failures become `502 Bad Gateway`; backend error statuses
    /// are passed through as-is.
    pub async fn forward(&self, req: Request<Body>) -> Response {
        let (parts, body) = req.into_parts();
        let id = parts.extensions.get::<RequestId>().cloned();
        let start = parts.extensions.get::<RequestStart>().copied();
        let tag = id.as_ref().map(|id| colored_id(&id.0)).unwrap_or_default();

        let url = self.director(&parts.uri);
        let mut headers = strip_hop_by_hop(&parts.headers);
        headers.remove(HOST);
        headers.remove(CONTENT_LENGTH);
        if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            append_forwarded_for(&mut headers, peer.ip());
        }

        let body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{} request body unreadable, forwarding empty: {}", tag, e);
                Bytes::new()
            }
        };

        let mut outbound = self
            .client
            .request(parts.method, url.clone())
            .headers(headers);
        if !body.is_empty() {
            outbound = outbound.body(body);
        }

        let response = match outbound.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("{} proxy error forwarding to {}: {}", tag, url, e);
                return StatusCode::BAD_GATEWAY.into_response();
            }
        };

        modify_response(response.status(), id.as_ref(), start);

        let mut builder = Response::builder().status(response.status());
        if let Some(out) = builder.headers_mut() {
            *out = strip_hop_by_hop(response.headers());
        }

        builder
            .body(Body::from_stream(response.bytes_stream()))
            .unwrap_or_else(|e| {
                error!("{} failed to relay backend response: {}", tag, e);
                StatusCode::BAD_GATEWAY.into_response()
            })
    }
}

/// Response hook: logs the backend status and the time since the request
/// entered the middleware. Observes only; the response is left untouched.
pub fn modify_response(status: StatusCode, id: Option<&RequestId>, start: Option<RequestStart>) {
    let elapsed: Option<Duration> = start.map(|RequestStart(at)| at.elapsed());
    let line = response_line(status, elapsed);
    match id {
        Some(id) => info!("{} {}\n", colored_id(&id.0), line),
        None => info!("{}\n", line),
    }
}

/// Parses and checks a backend base URL. A bare `host:port` is taken as http.
pub fn parse_backend(raw: &str) -> std::result::Result<Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|source| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::MissingHost(raw.to_string()));
    }
    Ok(url)
}

/// Joins a base path and a request path with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Copies `headers` without hop-by-hop headers, including any named in
/// the `Connection` header itself.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let named: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let key = name.as_str();
        if HOP_BY_HOP.contains(&key) || named.iter().any(|n| n == key) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Adds the client address to `X-Forwarded-For`, after any existing hops.
fn append_forwarded_for(headers: &mut HeaderMap, client: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let chain = if prior.is_empty() {
        client.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client)
    };
    if let Ok(value) = HeaderValue::from_str(&chain) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
