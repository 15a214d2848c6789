//! HTTP client for the console backend.
//!
//! One shared reqwest client covers both halves of the exchange: the login
//! handshake (`submit_credentials` / `submit_new_password`) and the forwarding
//! of console API traffic with the stored bearer token attached. The backend
//! itself is opaque; everything here is driven by its status codes and the
//! `{status, session, groups}` / `{detail}` body shapes.

pub mod error;
pub mod flow;
pub mod retry;

pub use error::{Error, GENERIC_LOGIN_FAILURE};
pub use flow::{FlowError, LoginFlow};
pub use retry::{RetryClass, RetryPolicy};

use crate::store::{TokenStore, ACCESS_TOKEN_KEY};
use crate::APP_USER_AGENT;
use anyhow::Result;
use axum::body::Bytes;
use reqwest::{
    header::{AUTHORIZATION, HOST},
    Client, Method, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const EMAIL_LOGIN_PATH: &str = "/auth/email-login";
pub const RESPOND_NEW_PASSWORD_PATH: &str = "/auth/respond-new-password";
pub const HOSTED_LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

const BACKEND_TIMEOUT: Duration = Duration::from_secs(30);
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);

/// Hosted-login identity providers the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    MicrosoftOidc,
}

impl Provider {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Google" => Some(Self::Google),
            "MicrosoftOIDC" => Some(Self::MicrosoftOidc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::MicrosoftOidc => "MicrosoftOIDC",
        }
    }
}

/// Outcome of one credential exchange. Transient: never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success {
        token: Option<String>,
        groups: Vec<String>,
    },
    NewPasswordRequired {
        session: String,
        user_id: String,
    },
}

#[derive(Deserialize, Debug)]
struct AuthResponse {
    status: String,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    groups: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    retry: RetryPolicy,
}

impl BackendClient {
    /// # Errors
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(BACKEND_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            retry: RetryPolicy::default(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send credentials to the login endpoint and interpret the auth-state
    /// response. A `NEW_PASSWORD_REQUIRED` status captures the continuation
    /// token but grants no access yet.
    ///
    /// # Errors
    /// [`Error::CredentialRejected`] when the backend refuses the
    /// credentials, [`Error::Transient`] on transport failure or 5xx.
    pub async fn submit_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, Error> {
        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .client
            .post(self.endpoint(EMAIL_LOGIN_PATH))
            .json(&payload)
            .send()
            .await?;

        Self::parse_auth_response(email, response).await
    }

    /// Complete a forced password change with the continuation token obtained
    /// from [`Self::submit_credentials`].
    ///
    /// # Errors
    /// Same surface as [`Self::submit_credentials`].
    pub async fn submit_new_password(
        &self,
        email: &str,
        new_password: &SecretString,
        session: &str,
    ) -> Result<AuthOutcome, Error> {
        let payload = json!({
            "email": email,
            "new_password": new_password.expose_secret(),
            "session": session,
        });

        let response = self
            .client
            .post(self.endpoint(RESPOND_NEW_PASSWORD_PATH))
            .json(&payload)
            .send()
            .await?;

        Self::parse_auth_response(email, response).await
    }

    async fn parse_auth_response(
        email: &str,
        response: reqwest::Response,
    ) -> Result<AuthOutcome, Error> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::auth_error(status, response).await);
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|err| Error::InvalidResponse(err.to_string()))?;

        match body.status.as_str() {
            "SUCCESS" => Ok(AuthOutcome::Success {
                token: body.token,
                groups: body.groups.unwrap_or_default(),
            }),
            "NEW_PASSWORD_REQUIRED" => Ok(AuthOutcome::NewPasswordRequired {
                // The challenge continuation may come back incomplete; empty
                // strings keep the reset flow reachable.
                session: body.session.unwrap_or_default(),
                user_id: body.user_id.unwrap_or_else(|| email.to_string()),
            }),
            other => Err(Error::InvalidResponse(format!("unknown status {other}"))),
        }
    }

    async fn auth_error(status: StatusCode, response: reqwest::Response) -> Error {
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);

        if retry::classify_status(status) == RetryClass::Eligible {
            return Error::Transient(status.to_string());
        }

        if status.is_client_error() {
            return Error::CredentialRejected(
                detail.unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string()),
            );
        }

        Error::Client(status)
    }

    /// Transport-level reachability probe for health reporting. Any HTTP
    /// answer counts; only connection failures and timeouts do not.
    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(&self.base_url)
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    /// Redirect initiation URL for the hosted login flow.
    #[must_use]
    pub fn hosted_login_url(&self, provider: Provider) -> String {
        format!(
            "{}{HOSTED_LOGIN_PATH}?provider={}",
            self.base_url,
            provider.as_str()
        )
    }

    /// Terminate the backend session. Best effort; callers log failures.
    ///
    /// # Errors
    /// Returns the backend status when the call does not succeed.
    pub async fn logout(&self) -> Result<(), Error> {
        let response = self.client.get(self.endpoint(LOGOUT_PATH)).send().await?;

        if !response.status().is_success() {
            return Err(Error::Client(response.status()));
        }

        Ok(())
    }

    /// Forward a console API request to the backend, attaching the stored
    /// bearer token when one exists. Absence of a token sends the request
    /// unauthenticated; rejecting it is the backend's job.
    ///
    /// A 401 response clears the stored token and surfaces
    /// [`Error::Unauthorized`] regardless of which endpoint was called.
    /// Retry-eligible failures (network, 502/503/504) consult the retry
    /// policy; with the default inert policy they surface after a single
    /// attempt. Other statuses pass through untouched.
    ///
    /// # Errors
    /// [`Error::Unauthorized`] on 401, [`Error::Transient`] on eligible
    /// failures once the retry budget is exhausted.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: axum::http::HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, Error> {
        let mut attempt = 0;

        loop {
            let result = self
                .send_once(method.clone(), path_and_query, headers.clone(), body.clone())
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED {
                        // Global side effect: any 401 invalidates the stored
                        // credential, whatever endpoint was hit.
                        self.store.remove(ACCESS_TOKEN_KEY);

                        return Err(Error::Unauthorized);
                    }

                    if retry::classify_status(status) == RetryClass::Eligible {
                        if let Some(delay) = self.retry.next_delay(attempt) {
                            warn!("Retrying {path_and_query} after {status} in {delay:?}");
                            attempt += 1;
                            tokio::time::sleep(delay).await;

                            continue;
                        }

                        return Err(Error::Transient(status.to_string()));
                    }

                    return Ok(response);
                }
                Err(err) => {
                    let err = Error::from(err);

                    if retry::classify_error(&err) == RetryClass::Eligible {
                        if let Some(delay) = self.retry.next_delay(attempt) {
                            warn!("Retrying {path_and_query} after {err} in {delay:?}");
                            attempt += 1;
                            tokio::time::sleep(delay).await;

                            continue;
                        }
                    }

                    return Err(err);
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path_and_query: &str,
        mut headers: axum::http::HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, reqwest::Error> {
        // Host belongs to the backend; any inbound Authorization is replaced
        // by the stored credential.
        headers.remove(HOST);
        headers.remove(AUTHORIZATION);

        let mut request = self
            .client
            .request(method, self.endpoint(path_and_query))
            .headers(headers)
            .body(body);

        if let Some(token) = self.store.get(ACCESS_TOKEN_KEY) {
            request = request.bearer_auth(token);
        } else {
            debug!("No stored access token; forwarding unauthenticated");
        }

        request.send().await
    }
}
