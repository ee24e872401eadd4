//! Client configuration from environment variables.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SESSION_KEY: &str = "sellhub_session";

/// Connection settings shared by the HTTP client and the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Storage key the session token is persisted under.
    pub session_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SELLHUB_API_URL`: backend base URL (default: "http://localhost:3333")
    /// - `SELLHUB_API_TIMEOUT_MS`: request timeout in milliseconds (default: 10000)
    /// - `SELLHUB_SESSION_KEY`: storage key for the session (default: "sellhub_session")
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("SELLHUB_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = match lookup("SELLHUB_API_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    crate::log_warn!(
                        "ignoring invalid SELLHUB_API_TIMEOUT_MS={raw:?}, using {}ms",
                        defaults.timeout.as_millis()
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        let session_key = lookup("SELLHUB_SESSION_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(defaults.session_key);

        Self {
            base_url,
            timeout,
            session_key,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
