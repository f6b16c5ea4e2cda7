//! Order source port definition.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Order;

/// Errors from fetching orders.
///
/// All of them abort the fetch; no partial batch is ever returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderSourceError {
    /// The source answered with anything but HTTP 200.
    #[error("order request failed (HTTP {status})")]
    RequestFailed {
        /// HTTP status code, for diagnostics only.
        status: u16,
    },

    /// The request never produced a response.
    #[error("order request failed: {message}")]
    Connection {
        /// Transport error description.
        message: String,
    },

    /// The response or one of its rows could not be mapped.
    #[error("malformed order response: {message}")]
    Malformed {
        /// What failed to parse.
        message: String,
    },
}

/// Port for fetching the current order list.
#[async_trait]
pub trait OrderSourcePort: Send + Sync {
    /// Fetch every order on the first page of the source listing, in
    /// response order.
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderSourceError>;
}
