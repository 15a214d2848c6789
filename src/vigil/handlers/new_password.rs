//! Forced password-change endpoint.

use super::{exchange_error_response, session_established_response, valid_email};
use crate::backend::{AuthOutcome, BackendClient, LoginFlow};
use crate::store::{TokenStore, ACCESS_TOKEN_KEY};
use crate::vigil::GatewayConfig;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize, Debug)]
pub struct NewPasswordRequest {
    email: String,
    new_password: String,
    session: String,
}

/// `POST /auth/login/new-password`. Completes the password challenge with the
/// continuation token captured at login; success makes the session usable.
pub async fn respond_new_password(
    config: Extension<Arc<GatewayConfig>>,
    backend: Extension<Arc<BackendClient>>,
    store: Extension<Arc<dyn TokenStore>>,
    payload: Option<Json<NewPasswordRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let pending = LoginFlow::NewPasswordRequired {
        session: request.session.clone(),
        user_id: request.email.clone(),
    };

    let new_password = SecretString::from(request.new_password);

    let outcome = match backend
        .submit_new_password(&request.email, &new_password, &request.session)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Password change failed: {err}");

            return exchange_error_response(&err);
        }
    };

    let token = match &outcome {
        AuthOutcome::Success { token, .. } => token.clone(),
        AuthOutcome::NewPasswordRequired { .. } => None,
    };
    if let Some(token) = &token {
        store.set(ACCESS_TOKEN_KEY, token);
    }

    match pending.advance(outcome) {
        Ok(LoginFlow::Done { groups }) => {
            session_established_response(&config, token.as_deref(), &groups)
        }
        Ok(_) => {
            error!("Password change did not complete the login flow");

            (
                StatusCode::BAD_GATEWAY,
                "Password change failed".to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!("Password change did not complete the login flow: {err}");

            (
                StatusCode::BAD_GATEWAY,
                "Password change failed".to_string(),
            )
                .into_response()
        }
    }
}
