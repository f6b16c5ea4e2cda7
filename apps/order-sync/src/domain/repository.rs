//! Order Repository Trait
//!
//! Persistence port for mapped orders. Implemented by adapters in the
//! infrastructure layer (PostgreSQL, in-memory).

use async_trait::async_trait;
use thiserror::Error;

use super::order::Order;

/// Errors from inserting a batch of orders.
///
/// Every variant means the whole batch was rolled back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Could not open or keep the database connection.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// An order id in the batch already exists, or appears twice in it.
    #[error("duplicate order id: {order_id}")]
    DuplicateOrderId {
        /// The conflicting order id.
        order_id: String,
    },

    /// A table constraint rejected the batch.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Statement construction or execution failed for another reason.
    #[error("insert failed: {0}")]
    Query(String),

    /// The batch needs more bind parameters than one statement can carry.
    #[error("batch of {rows} orders exceeds the single-statement limit of {max_rows}")]
    BatchTooLarge {
        /// Orders in the batch.
        rows: usize,
        /// Largest batch one statement accepts.
        max_rows: usize,
    },
}

/// Repository trait for order persistence.
///
/// There is no update or delete path: orders are written once.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert all orders in a single transaction.
    ///
    /// Either every order is stored or none is. An empty slice is a no-op
    /// and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns a `RepositoryError` after the transaction has been rolled back.
    async fn insert_batch(&self, orders: &[Order]) -> Result<usize, RepositoryError>;
}
