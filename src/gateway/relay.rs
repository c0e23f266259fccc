//! Same-origin relay
//!
//! Forwards `/api/proxy/{...path}` to the configured upstream, preserving
//! method, query string, headers (minus hop-by-hop ones) and body, and
//! relays the upstream status and body back byte-for-byte.

use super::RelayConfig;
use crate::{Result, VoxError};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use log::{debug, error, info};
use serde::Serialize;
use std::sync::Arc;

/// Path prefix handled by the relay
pub const PROXY_PREFIX: &str = "/api/proxy/";

/// Request headers never forwarded upstream
pub const REQUEST_HOP_HEADERS: [&str; 4] =
    ["host", "content-length", "connection", "accept-encoding"];

/// Response headers dropped because the relay re-frames the body
pub const RESPONSE_FRAMING_HEADERS: [&str; 3] =
    ["transfer-encoding", "content-encoding", "content-length"];

/// Shared, read-only relay state
struct RelayState {
    upstream: String,
    client: reqwest::Client,
}

/// Create the axum router for the relay
pub fn create_router(config: RelayConfig) -> Result<Router> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.timeout)
        .build()?;

    let state = Arc::new(RelayState {
        upstream: config.upstream.trim_end_matches('/').to_string(),
        client,
    });

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/proxy/{*path}", any(relay))
        .with_state(state))
}

/// Bind the configured address and serve until the process exits
pub async fn run_relay(config: RelayConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    run_relay_with_listener(listener, config).await
}

/// Serve on an already bound listener
pub async fn run_relay_with_listener(
    listener: tokio::net::TcpListener,
    config: RelayConfig,
) -> anyhow::Result<()> {
    info!(
        "Relay listening on {} -> {}",
        listener.local_addr()?,
        config.upstream
    );
    let app = create_router(config)?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Relay any request under the proxy prefix
async fn relay(
    State(state): State<Arc<RelayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match forward(&state, method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            error!("Proxy error: {}", e);
            relay_failure(&e)
        }
    }
}

async fn forward(
    state: &RelayState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let suffix = uri.path().strip_prefix(PROXY_PREFIX).unwrap_or("");
    let url = upstream_url(&state.upstream, suffix, uri.query());
    debug!("{} {} -> {}", method, uri, url);

    let mut request = state
        .client
        .request(method.clone(), &url)
        .headers(strip_headers(headers, &REQUEST_HOP_HEADERS));

    if method != Method::GET && method != Method::HEAD {
        request = request.body(encode_body(headers, body));
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| VoxError::Relay(e.to_string()))?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| VoxError::Relay(e.to_string()))?;
    let response_headers = strip_headers(upstream.headers(), &RESPONSE_FRAMING_HEADERS);
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| VoxError::Relay(e.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// `{upstream}/{suffix}{?query}`
pub fn upstream_url(upstream: &str, suffix: &str, query: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}",
        upstream.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    );
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Copy of `headers` without the named ones
pub fn strip_headers(headers: &HeaderMap, drop: &[&str]) -> HeaderMap {
    let mut kept = HeaderMap::new();
    for (name, value) in headers {
        if !drop.contains(&name.as_str()) {
            kept.append(name.clone(), value.clone());
        }
    }
    kept
}

/// JSON bodies are re-encoded (empty becomes `{}`); others pass verbatim
pub fn encode_body(headers: &HeaderMap, body: Bytes) -> Bytes {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return body;
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Bytes::from_static(b"{}");
    }

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => serde_json::to_vec(&value).map(Bytes::from).unwrap_or(body),
        Err(e) => {
            debug!("Forwarding unparsable JSON body verbatim: {}", e);
            body
        }
    }
}

/// Fixed 502 answer with a diagnostic body
fn relay_failure(e: &VoxError) -> Response {
    let body = serde_json::json!({
        "error": "Proxy failed",
        "details": e.to_string(),
    });
    (StatusCode::BAD_GATEWAY, Json(body)).into_response()
}
