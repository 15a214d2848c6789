//! Fallback proxy: console API traffic forwarded to the backend.

use crate::backend::{BackendClient, Error};
use crate::gate;
use axum::{
    body::to_bytes,
    extract::{Extension, Request},
    http::{
        header::{CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::error;

// The console API deals in small JSON payloads; buffering is fine.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Forward anything unmatched to the backend with the stored bearer token
/// attached. A 401 from the backend means the credential is gone; the browser
/// goes back to login.
pub async fn forward(backend: Extension<Arc<BackendClient>>, request: Request) -> Response {
    let method = request.method().clone();
    let path_and_query = request.uri().path_and_query().map_or_else(
        || request.uri().path().to_string(),
        |pq| pq.as_str().to_string(),
    );
    let headers = request.headers().clone();

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Failed to buffer request body: {err}");

            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            )
                .into_response();
        }
    };

    match backend.forward(method, &path_and_query, headers, body).await {
        Ok(response) => {
            let status = response.status();

            let mut headers = HeaderMap::new();
            for (name, value) in response.headers() {
                // Framing and hop-by-hop headers are recomputed locally.
                if *name == CONNECTION || *name == TRANSFER_ENCODING || *name == CONTENT_LENGTH {
                    continue;
                }
                headers.append(name.clone(), value.clone());
            }

            match response.bytes().await {
                Ok(bytes) => (status, headers, bytes).into_response(),
                Err(err) => {
                    error!("Failed to read backend response: {err}");

                    (StatusCode::BAD_GATEWAY, "Backend unavailable".to_string()).into_response()
                }
            }
        }
        Err(Error::Unauthorized) => Redirect::temporary(gate::LOGIN_PATH).into_response(),
        Err(err) => {
            error!("Backend forward failed: {err}");

            (StatusCode::BAD_GATEWAY, "Backend unavailable".to_string()).into_response()
        }
    }
}
