//! Order source (MoySklad) configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::moysklad::{DEFAULT_BASE_URL, MoySkladConfig};

/// Order source settings.
#[derive(Clone, Deserialize)]
pub struct SourceConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account login.
    #[serde(default)]
    pub login: String,
    /// Account password.
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds; unset means no client-side timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login: String::new(),
            password: String::new(),
            timeout_secs: None,
        }
    }
}

impl SourceConfig {
    /// Build the adapter configuration.
    #[must_use]
    pub fn to_client_config(&self) -> MoySkladConfig {
        let config = MoySkladConfig::new(self.login.clone(), self.password.clone())
            .with_base_url(self.base_url.clone());
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_carries_timeout() {
        let config = SourceConfig {
            login: "login".to_string(),
            password: "secret".to_string(),
            timeout_secs: Some(15),
            ..SourceConfig::default()
        };
        let client = config.to_client_config();
        assert_eq!(client.timeout, Some(Duration::from_secs(15)));
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn no_timeout_by_default() {
        assert!(SourceConfig::default().to_client_config().timeout.is_none());
    }
}
