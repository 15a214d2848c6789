//! Error taxonomy for backend exchanges.

use reqwest::StatusCode;
use thiserror::Error;

/// Fallback user-facing message when the backend gives no `detail`.
pub const GENERIC_LOGIN_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected the submitted credentials. The message is
    /// user-facing: the backend `detail` field when present, otherwise
    /// [`GENERIC_LOGIN_FAILURE`].
    #[error("{0}")]
    CredentialRejected(String),
    /// A forwarded call came back 401. The stored access token has already
    /// been cleared; the caller must force re-authentication.
    #[error("unauthorized")]
    Unauthorized,
    /// Non-retryable backend error (403, 404, 500).
    #[error("backend error: {0}")]
    Client(StatusCode),
    /// Retry-eligible failure: connection error, timeout, 502/503/504.
    #[error("transient backend failure: {0}")]
    Transient(String),
    /// The response body did not match the expected shape.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

impl Error {
    /// Message shown to the user under the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CredentialRejected(message) => message.clone(),
            _ => GENERIC_LOGIN_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_detail() {
        let err = Error::CredentialRejected("Incorrect username or password.".to_string());
        assert_eq!(err.user_message(), "Incorrect username or password.");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        assert_eq!(
            Error::Transient("connection refused".to_string()).user_message(),
            GENERIC_LOGIN_FAILURE
        );
        assert_eq!(Error::Client(StatusCode::NOT_FOUND).user_message(), GENERIC_LOGIN_FAILURE);
    }
}
