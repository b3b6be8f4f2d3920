//! Client configuration parsed from environment variables

use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, no trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Parse configuration from `CELLSWAP_API_URL` and
    /// `CELLSWAP_HTTP_TIMEOUT_SECS`, with local-dev defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("CELLSWAP_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout = env::var("CELLSWAP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let mut config = Self::new(&base_url);
        config.timeout = timeout;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = Config::new("https://api.cellswap.example/v1/");
        assert_eq!(config.base_url, "https://api.cellswap.example/v1");
    }

    #[test]
    fn test_default_timeout() {
        let config = Config::new("http://localhost:4000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
