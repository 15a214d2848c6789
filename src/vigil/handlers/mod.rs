//! Gateway route handlers and shared helpers.
//!
//! Cookie building follows one rule: the session cookie set is written only
//! after a credential exchange, and the gate never writes anything.

pub mod health;
pub mod hosted;
pub mod login;
pub mod logout;
pub mod new_password;
pub mod proxy;

use crate::backend::Error;
use crate::gate::{LOGIN_STATUS_COOKIE, SESSION_COOKIE, TOKEN_COOKIE, USER_ID_COOKIE};
use crate::vigil::GatewayConfig;
use axum::{
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use regex::Regex;
use serde_json::json;
use tracing::error;

// axum handler for the service banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Lightweight email sanity check before the exchange hits the backend.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub(crate) fn set_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(name, "", 0, secure)
}

pub(crate) fn append_cookie(
    headers: &mut HeaderMap,
    cookie: Result<HeaderValue, InvalidHeaderValue>,
) {
    match cookie {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(err) => error!("Failed to build cookie header: {err}"),
    }
}

/// Response for a completed login: token cookie (when the backend returned
/// one), `loginStatus=SUCCESS`, and the challenge cookies expired.
pub(crate) fn session_established_response(
    config: &GatewayConfig,
    token: Option<&str>,
    groups: &[String],
) -> Response {
    let secure = config.cookie_secure();
    let max_age = config.session_max_age_seconds();

    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        append_cookie(&mut headers, set_cookie(TOKEN_COOKIE, token, max_age, secure));
    }
    append_cookie(
        &mut headers,
        set_cookie(LOGIN_STATUS_COOKIE, "SUCCESS", max_age, secure),
    );
    append_cookie(&mut headers, clear_cookie(USER_ID_COOKIE, secure));
    append_cookie(&mut headers, clear_cookie(SESSION_COOKIE, secure));

    (
        StatusCode::OK,
        headers,
        Json(json!({"status": "SUCCESS", "groups": groups})),
    )
        .into_response()
}

/// Map an exchange error onto the `{detail}` body the console renders under
/// the form.
pub(crate) fn exchange_error_response(err: &Error) -> Response {
    let status = match err {
        Error::CredentialRejected(_) | Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::Client(_) | Error::Transient(_) | Error::InvalidResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    };

    (status, Json(json!({"detail": err.user_message()}))).into_response()
}
