//! Login and reset-password pages, plus hosted-login redirect initiation.

use crate::backend::{BackendClient, Provider};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

// Placeholder shells; the console frontend owns the real UI.
const LOGIN_SHELL: &str = "<!doctype html><title>Sign in</title><h1>Sign in</h1>";
const RESET_SHELL: &str =
    "<!doctype html><title>Set a new password</title><h1>Set a new password</h1>";

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
    provider: Option<String>,
}

/// `GET /auth/login`. With a `provider` query, initiates the hosted-login
/// redirect; without one, serves the login shell. Always reachable: the gate
/// excludes this path.
pub async fn login(
    backend: Extension<Arc<BackendClient>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(provider) = query.provider.as_deref() {
        return match Provider::parse(provider) {
            Some(provider) => {
                let url = backend.hosted_login_url(provider);

                debug!(%url, "hosted login redirect");

                Redirect::temporary(&url).into_response()
            }
            None => (StatusCode::BAD_REQUEST, "Unknown provider".to_string()).into_response(),
        };
    }

    Html(LOGIN_SHELL).into_response()
}

/// `GET /auth/reset-password`. Target of the gate's forced-reset redirect;
/// the `flow`, `userId` and `session` query values are consumed client-side.
pub async fn reset_password() -> impl IntoResponse {
    Html(RESET_SHELL)
}
