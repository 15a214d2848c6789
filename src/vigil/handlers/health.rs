//! Health endpoint: build info plus backend reachability.

use crate::backend::BackendClient;
use crate::vigil::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;

/// `GET /health`. The `backend` field reports whether the console backend
/// answers at the transport level; the gateway itself is healthy either way.
pub async fn health(backend: Extension<Arc<BackendClient>>) -> impl IntoResponse {
    let backend_status = if backend.is_reachable().await {
        "reachable"
    } else {
        "unreachable"
    };

    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
        "backend": backend_status,
    }));

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        "X-App",
        format!(
            "{}:{}:{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            short_hash
        )
        .parse()
        .unwrap(),
    );

    (headers, body)
}
