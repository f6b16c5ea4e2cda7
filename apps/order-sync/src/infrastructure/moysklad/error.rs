//! MoySklad-specific error types.

use thiserror::Error;

use crate::application::ports::OrderSourceError;

/// Errors from the MoySklad adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoySkladError {
    /// Login or password is empty.
    #[error("MoySklad login and password are required")]
    MissingCredentials,

    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a status other than 200.
    #[error("Order request failed: HTTP {status}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for logs.
        body: String,
    },

    /// The body is not an order listing.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// One row could not be mapped to an order; the whole fetch is aborted.
    #[error("Malformed order row {index}: {message}")]
    MalformedRow {
        /// Zero-based position of the row in `rows`.
        index: usize,
        /// Parse failure description.
        message: String,
    },
}

impl From<MoySkladError> for OrderSourceError {
    fn from(err: MoySkladError) -> Self {
        match err {
            MoySkladError::RequestFailed { status, .. } => Self::RequestFailed { status },
            MoySkladError::Network(message) => Self::Connection { message },
            MoySkladError::MissingCredentials => Self::Connection {
                message: MoySkladError::MissingCredentials.to_string(),
            },
            MoySkladError::JsonParse(message) => Self::Malformed { message },
            MoySkladError::MalformedRow { index, message } => Self::Malformed {
                message: format!("row {index}: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_keeps_only_status() {
        let err = MoySkladError::RequestFailed {
            status: 500,
            body: "oops".to_string(),
        };
        let source_err: OrderSourceError = err.into();
        assert_eq!(source_err, OrderSourceError::RequestFailed { status: 500 });
        assert!(source_err.to_string().contains("order request failed"));
    }

    #[test]
    fn network_maps_to_connection() {
        let source_err: OrderSourceError =
            MoySkladError::Network("connection refused".to_string()).into();
        assert!(matches!(source_err, OrderSourceError::Connection { .. }));
    }

    #[test]
    fn malformed_row_keeps_index() {
        let source_err: OrderSourceError = MoySkladError::MalformedRow {
            index: 3,
            message: "missing field `created`".to_string(),
        }
        .into();
        assert_eq!(
            source_err,
            OrderSourceError::Malformed {
                message: "row 3: missing field `created`".to_string()
            }
        );
    }
}
