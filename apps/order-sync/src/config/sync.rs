//! Sync run behaviour.

use serde::Deserialize;

/// Sync run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Exit non-zero when the fetched batch could not be stored. When
    /// `false` a store failure is only logged and the process exits 0.
    #[serde(default = "default_fail_on_store_error")]
    pub fail_on_store_error: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fail_on_store_error: default_fail_on_store_error(),
        }
    }
}

const fn default_fail_on_store_error() -> bool {
    true
}
