//! Backend connection settings.

use xpert_core::defaults;

/// Configuration for [`crate::HttpStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the backend API.
    pub base_url: String,
    /// Bearer token (optional for local backends).
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BACKEND_URL.to_string(),
            token: None,
            timeout_seconds: defaults::BACKEND_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `BACKEND_URL` | `http://localhost:3000` | Backend API base |
    /// | `BACKEND_TOKEN` | (none) | Bearer token |
    /// | `BACKEND_TIMEOUT` | `30` | Request timeout (seconds) |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BACKEND_URL")
                .ok()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| defaults::BACKEND_URL.to_string()),
            token: std::env::var("BACKEND_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_seconds: std::env::var("BACKEND_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::BACKEND_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = StoreConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.token.is_none());
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_builders() {
        let config = StoreConfig::default()
            .with_base_url("http://backend:8080/api")
            .with_token("secret");
        assert_eq!(config.base_url, "http://backend:8080/api");
        assert_eq!(config.token.as_deref(), Some("secret"));
    }
}
