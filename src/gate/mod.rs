//! Per-request session gate.
//!
//! Runs before any route logic and decides, from the session cookie set
//! alone, whether a request may proceed or must be redirected to the login
//! or forced password-reset page. The gate stores nothing between requests;
//! the authentication state is derived freshly from cookies every time.

pub mod middleware;

use axum::http::{header::COOKIE, HeaderMap};
use tracing::debug;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/auth/login";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

pub const TOKEN_COOKIE: &str = "token";
pub const LOGIN_STATUS_COOKIE: &str = "loginStatus";
pub const USER_ID_COOKIE: &str = "userId";
pub const SESSION_COOKIE: &str = "session";

/// Paths the gate never touches: static assets, the favicon, and the login
/// page itself, which must stay reachable to break the redirect loop.
const EXCLUDED_PREFIXES: &[&str] = &[
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/auth/login",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Success,
    NewPasswordRequired,
}

impl LoginStatus {
    /// Cookie values are set by the login flow; anything else counts as absent.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(Self::Success),
            "NEW_PASSWORD_REQUIRED" => Some(Self::NewPasswordRequired),
            _ => None,
        }
    }
}

/// The session cookie set, as read from a single request. Every field is
/// optional; the gate treats a malformed cookie the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub token: Option<String>,
    pub login_status: Option<LoginStatus>,
    pub user_id: Option<String>,
    pub session: Option<String>,
}

impl SessionCookies {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();

        let Some(header) = headers.get(COOKIE) else {
            return cookies;
        };

        let Ok(value) = header.to_str() else {
            return cookies;
        };

        for pair in value.split(';') {
            let trimmed = pair.trim();
            let mut parts = trimmed.splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            match key.trim() {
                // An empty token value is a cleared cookie, not a credential.
                TOKEN_COOKIE => {
                    let val = val.trim();
                    if !val.is_empty() {
                        cookies.token = Some(val.to_string());
                    }
                }
                LOGIN_STATUS_COOKIE => cookies.login_status = LoginStatus::parse(val.trim()),
                USER_ID_COOKIE => cookies.user_id = Some(val.trim().to_string()),
                SESSION_COOKIE => cookies.session = Some(val.trim().to_string()),
                _ => {}
            }
        }

        cookies
    }
}

/// Routing outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToResetPassword { user_id: String, session: String },
}

impl Decision {
    /// Redirect target, or `None` when the request may proceed.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_PATH.to_string()),
            Self::RedirectToResetPassword { user_id, session } => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair("flow", "SET_NEW_PASSWORD")
                    .append_pair("userId", user_id)
                    .append_pair("session", session)
                    .finish();

                Some(format!("{RESET_PASSWORD_PATH}?{query}"))
            }
        }
    }
}

type Guard = fn(&str, &SessionCookies) -> Option<Decision>;

/// Ordered guard list, first match wins. The order carries the priority
/// rules: excluded paths are untouchable, and a missing token outranks a
/// pending password reset.
const GUARDS: &[(&str, Guard)] = &[
    ("excluded-path", allow_excluded),
    ("missing-token", require_token),
    ("password-reset-pending", require_password_reset),
];

fn allow_excluded(path: &str, _cookies: &SessionCookies) -> Option<Decision> {
    is_excluded(path).then_some(Decision::Allow)
}

fn require_token(path: &str, cookies: &SessionCookies) -> Option<Decision> {
    if cookies.token.is_none() && !is_login_path(path) {
        return Some(Decision::RedirectToLogin);
    }

    None
}

fn require_password_reset(path: &str, cookies: &SessionCookies) -> Option<Decision> {
    if cookies.login_status == Some(LoginStatus::NewPasswordRequired)
        && !path.starts_with(RESET_PASSWORD_PATH)
    {
        // Missing challenge cookies are forwarded as empty strings; the reset
        // page owns the handling of an incomplete challenge.
        return Some(Decision::RedirectToResetPassword {
            user_id: cookies.user_id.clone().unwrap_or_default(),
            session: cookies.session.clone().unwrap_or_default(),
        });
    }

    None
}

/// Decide the routing outcome for a request path and its session cookies.
///
/// Pure: no cookie is ever mutated here, and nothing is remembered across
/// calls.
#[must_use]
pub fn decide(path: &str, cookies: &SessionCookies) -> Decision {
    for (name, guard) in GUARDS {
        if let Some(decision) = guard(path, cookies) {
            debug!(guard = name, path, "gate decision");

            return decision;
        }
    }

    Decision::Allow
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn is_login_path(path: &str) -> bool {
    path.starts_with(LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cookies(token: Option<&str>, status: Option<&str>) -> SessionCookies {
        SessionCookies {
            token: token.map(ToString::to_string),
            login_status: status.and_then(LoginStatus::parse),
            user_id: None,
            session: None,
        }
    }

    #[test]
    fn test_no_token_redirects_to_login() {
        let decision = decide("/dashboard", &SessionCookies::default());
        assert_eq!(decision, Decision::RedirectToLogin);
        assert_eq!(decision.location(), Some("/auth/login".to_string()));
    }

    #[test]
    fn test_no_token_login_path_allowed() {
        assert_eq!(decide("/auth/login", &SessionCookies::default()), Decision::Allow);
    }

    #[test]
    fn test_token_only_allows() {
        assert_eq!(decide("/dashboard", &cookies(Some("t1"), None)), Decision::Allow);
        assert_eq!(
            decide("/dashboard", &cookies(Some("t1"), Some("SUCCESS"))),
            Decision::Allow
        );
    }

    #[test]
    fn test_password_reset_pending_redirects() {
        let cookies = SessionCookies {
            token: Some("t1".to_string()),
            login_status: Some(LoginStatus::NewPasswordRequired),
            user_id: Some("u1".to_string()),
            session: Some("s1".to_string()),
        };

        let decision = decide("/dashboard", &cookies);
        assert_eq!(
            decision,
            Decision::RedirectToResetPassword {
                user_id: "u1".to_string(),
                session: "s1".to_string(),
            }
        );
        assert_eq!(
            decision.location(),
            Some("/auth/reset-password?flow=SET_NEW_PASSWORD&userId=u1&session=s1".to_string())
        );
    }

    #[test]
    fn test_password_reset_pending_missing_challenge_cookies() {
        // The challenge cookies fall back to empty strings rather than failing.
        let decision = decide("/dashboard", &cookies(Some("t1"), Some("NEW_PASSWORD_REQUIRED")));
        assert_eq!(
            decision,
            Decision::RedirectToResetPassword {
                user_id: String::new(),
                session: String::new(),
            }
        );
        assert_eq!(
            decision.location(),
            Some("/auth/reset-password?flow=SET_NEW_PASSWORD&userId=&session=".to_string())
        );
    }

    #[test]
    fn test_missing_token_outranks_password_reset() {
        // Both conditions apply; the missing-token rule wins by order.
        let decision = decide("/dashboard", &cookies(None, Some("NEW_PASSWORD_REQUIRED")));
        assert_eq!(decision, Decision::RedirectToLogin);
    }

    #[test]
    fn test_reset_password_path_not_redirected_again() {
        let decision = decide(
            "/auth/reset-password",
            &cookies(Some("t1"), Some("NEW_PASSWORD_REQUIRED")),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_excluded_paths_always_allow() {
        for path in ["/_next/static/x", "/_next/image/logo.png", "/favicon.ico", "/auth/login"] {
            assert_eq!(decide(path, &SessionCookies::default()), Decision::Allow, "{path}");
            assert_eq!(
                decide(path, &cookies(Some("t1"), Some("NEW_PASSWORD_REQUIRED"))),
                Decision::Allow,
                "{path}"
            );
        }
    }

    #[test]
    fn test_reset_redirect_encodes_query_values() {
        let decision = Decision::RedirectToResetPassword {
            user_id: "u 1".to_string(),
            session: "a&b=c".to_string(),
        };
        assert_eq!(
            decision.location(),
            Some("/auth/reset-password?flow=SET_NEW_PASSWORD&userId=u+1&session=a%26b%3Dc".to_string())
        );
    }

    #[test]
    fn test_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static(
                "token=t1; loginStatus=NEW_PASSWORD_REQUIRED; userId=u1; session=s1; other=x",
            ),
        );

        let cookies = SessionCookies::from_headers(&headers);
        assert_eq!(cookies.token, Some("t1".to_string()));
        assert_eq!(cookies.login_status, Some(LoginStatus::NewPasswordRequired));
        assert_eq!(cookies.user_id, Some("u1".to_string()));
        assert_eq!(cookies.session, Some("s1".to_string()));
    }

    #[test]
    fn test_cookie_parsing_unknown_status_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=t1; loginStatus=WEIRD"));

        let cookies = SessionCookies::from_headers(&headers);
        assert_eq!(cookies.token, Some("t1".to_string()));
        assert_eq!(cookies.login_status, None);
    }

    #[test]
    fn test_cookie_parsing_empty_token_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=; loginStatus=SUCCESS"));

        let cookies = SessionCookies::from_headers(&headers);
        assert_eq!(cookies.token, None);
        assert_eq!(decide("/dashboard", &cookies), Decision::RedirectToLogin);
    }

    #[test]
    fn test_cookie_parsing_no_header() {
        assert_eq!(SessionCookies::from_headers(&HeaderMap::new()), SessionCookies::default());
    }
}
