//! # Chainview Proxy
//!
//! A stateless JSON-RPC forward proxy. Browser clients cannot talk to
//! arbitrary RPC endpoints directly, so they POST `{chainId, rpcUrl, body}`
//! here; the proxy rejects anything outside the fixed allow-list of known
//! public endpoints and otherwise forwards the JSON-RPC body verbatim,
//! relaying the upstream status and body unchanged.
//!
//! Rules, in order:
//! - any missing field is HTTP 400,
//! - an `rpcUrl` outside the allow-list is HTTP 403, with no upstream call,
//! - CORS preflight answers 200 with permissive headers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;

pub use config::ProxyConfig;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Timeout applied to the upstream leg when none is configured.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared proxy state: the upstream HTTP client and the endpoint allow-list.
#[derive(Debug)]
pub struct ProxyState {
    http: reqwest::Client,
    allowed: HashSet<String>,
}

impl Default for ProxyState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyState {
    /// Builds the state with the registry's endpoint allow-list.
    pub fn new() -> Self {
        Self::with_allowed(chainview_registry::allowed_rpc_endpoints())
    }

    /// Builds the state with an explicit allow-list.
    pub fn with_allowed(endpoints: Vec<String>) -> Self {
        Self::with_allowed_and_timeout(endpoints, DEFAULT_UPSTREAM_TIMEOUT)
    }

    /// Builds the state with an explicit allow-list and upstream timeout.
    pub fn with_allowed_and_timeout(endpoints: Vec<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            allowed: endpoints.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest {
    chain_id: Option<u64>,
    rpc_url: Option<String>,
    body: Option<serde_json::Value>,
}

/// Builds the proxy router.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/rpc", post(forward))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router until the listener is closed.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<ProxyState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

async fn forward(State(state): State<Arc<ProxyState>>, raw: Bytes) -> Response {
    let request: ProxyRequest = match serde_json::from_slice(&raw) {
        Ok(request) => request,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "malformed JSON body"),
    };

    let (Some(chain_id), Some(rpc_url), Some(body)) =
        (request.chain_id, request.rpc_url, request.body)
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "chainId, rpcUrl and body are all required",
        );
    };

    if !state.allowed.contains(&rpc_url) {
        tracing::warn!(chain_id, %rpc_url, "rejected endpoint outside allow-list");
        return error_response(StatusCode::FORBIDDEN, "rpcUrl is not an allowed endpoint");
    }

    let upstream = match state.http.post(&rpc_url).json(&body).send().await {
        Ok(upstream) => upstream,
        Err(err) => {
            tracing::warn!(chain_id, %rpc_url, %err, "upstream request failed");
            return error_response(StatusCode::BAD_GATEWAY, "upstream request failed");
        }
    };

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.bytes().await {
        Ok(bytes) => {
            (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(err) => {
            tracing::warn!(chain_id, %rpc_url, %err, "upstream body read failed");
            error_response(StatusCode::BAD_GATEWAY, "upstream body read failed")
        }
    }
}
