//! Email/password login endpoint.

use super::{
    append_cookie, exchange_error_response, session_established_response, set_cookie, valid_email,
};
use crate::backend::{AuthOutcome, BackendClient, LoginFlow};
use crate::gate::{LOGIN_STATUS_COOKIE, SESSION_COOKIE, USER_ID_COOKIE};
use crate::store::{TokenStore, ACCESS_TOKEN_KEY};
use crate::vigil::GatewayConfig;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Challenge cookies only need to outlive the reset flow.
const CHALLENGE_MAX_AGE_SECONDS: i64 = 15 * 60;

#[derive(Deserialize, Debug)]
pub struct EmailLoginRequest {
    email: String,
    password: String,
}

/// `POST /auth/login/email`. Submits credentials to the backend and writes
/// the session cookie set according to the outcome.
pub async fn email_login(
    config: Extension<Arc<GatewayConfig>>,
    backend: Extension<Arc<BackendClient>>,
    store: Extension<Arc<dyn TokenStore>>,
    payload: Option<Json<EmailLoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let password = SecretString::from(request.password);

    let outcome = match backend.submit_credentials(&request.email, &password).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Login exchange failed: {err}");

            return exchange_error_response(&err);
        }
    };

    // Store the bearer credential before the flow advances; the cookie only
    // signals presence to the gate.
    let token = match &outcome {
        AuthOutcome::Success { token, .. } => token.clone(),
        AuthOutcome::NewPasswordRequired { .. } => None,
    };
    if let Some(token) = &token {
        store.set(ACCESS_TOKEN_KEY, token);
    }

    match LoginFlow::Login.advance(outcome) {
        Ok(LoginFlow::NewPasswordRequired { session, user_id }) => {
            let secure = config.cookie_secure();

            let mut headers = HeaderMap::new();
            append_cookie(
                &mut headers,
                set_cookie(
                    LOGIN_STATUS_COOKIE,
                    "NEW_PASSWORD_REQUIRED",
                    CHALLENGE_MAX_AGE_SECONDS,
                    secure,
                ),
            );
            append_cookie(
                &mut headers,
                set_cookie(USER_ID_COOKIE, &user_id, CHALLENGE_MAX_AGE_SECONDS, secure),
            );
            append_cookie(
                &mut headers,
                set_cookie(SESSION_COOKIE, &session, CHALLENGE_MAX_AGE_SECONDS, secure),
            );

            (
                StatusCode::OK,
                headers,
                Json(json!({"status": "NEW_PASSWORD_REQUIRED"})),
            )
                .into_response()
        }
        Ok(LoginFlow::Done { groups }) => {
            session_established_response(&config, token.as_deref(), &groups)
        }
        Ok(LoginFlow::Login) | Err(_) => {
            error!("Login flow reached an impossible state");

            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string()).into_response()
        }
    }
}
