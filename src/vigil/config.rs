//! Gateway configuration.

const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    backend_url: String,
    cookie_secure: bool,
    session_max_age_seconds: i64,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(backend_url: String) -> Self {
        Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            cookie_secure: false,
            session_max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECONDS,
        }
    }

    /// Only mark cookies `Secure` when the console is served over HTTPS.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_session_max_age_seconds(mut self, seconds: i64) -> Self {
        self.session_max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn session_max_age_seconds(&self) -> i64 {
        self.session_max_age_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("http://backend.tld/".to_string());
        assert_eq!(config.backend_url(), "http://backend.tld");
        assert!(!config.cookie_secure());
        assert_eq!(config.session_max_age_seconds(), 12 * 60 * 60);
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::new("http://backend.tld".to_string())
            .with_cookie_secure(true)
            .with_session_max_age_seconds(60);
        assert!(config.cookie_secure());
        assert_eq!(config.session_max_age_seconds(), 60);
    }
}
