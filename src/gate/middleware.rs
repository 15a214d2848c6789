//! Axum middleware wrapping the gate decision.

use super::{decide, SessionCookies};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

/// Runs once per incoming request, before routing. Converts the gate decision
/// into a temporary redirect or passes the request through untouched.
pub async fn gate(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let cookies = SessionCookies::from_headers(request.headers());

    match decide(&path, &cookies).location() {
        Some(location) => {
            debug!(%path, %location, "gate redirect");

            Redirect::temporary(&location).into_response()
        }
        None => next.run(request).await,
    }
}
