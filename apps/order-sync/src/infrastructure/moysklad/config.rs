//! MoySklad adapter configuration.

use std::time::Duration;

/// Production JSON API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.moysklad.ru/api/remap/1.2";

/// Customer order listing, relative to the base URL.
pub const CUSTOMER_ORDER_PATH: &str = "/entity/customerorder";

/// Configuration for the MoySklad order client.
#[derive(Clone)]
pub struct MoySkladConfig {
    /// Account login.
    pub login: String,
    /// Account password.
    pub password: String,
    /// API base URL.
    pub base_url: String,
    /// HTTP request timeout; `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl MoySkladConfig {
    /// Create a configuration against the production API.
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Point the client at another base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full URL of the customer order listing.
    #[must_use]
    pub fn orders_url(&self) -> String {
        format!(
            "{}{CUSTOMER_ORDER_PATH}",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for MoySkladConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoySkladConfig")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_api() {
        let config = MoySkladConfig::new("login", "secret");
        assert_eq!(
            config.orders_url(),
            "https://api.moysklad.ru/api/remap/1.2/entity/customerorder"
        );
        assert!(config.timeout.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = MoySkladConfig::new("login", "secret").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(
            config.orders_url(),
            "http://127.0.0.1:9000/entity/customerorder"
        );
    }

    #[test]
    fn with_timeout() {
        let config = MoySkladConfig::new("login", "secret").with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn debug_redacts_password() {
        let config = MoySkladConfig::new("login", "secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("login"));
        assert!(!debug.contains("secret"));
    }
}
