//! Sync Orders Use Case
//!
//! One fetch-then-store cycle: `Fetching -> Storing -> Done`.
//!
//! A fetch failure ends the run with `SyncError` and the store step never
//! runs. A store failure does not: the repository has already rolled back,
//! the run still reaches `Done`, and the failure is carried in
//! `SyncReport::store` for the caller to act on.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{OrderSourceError, OrderSourcePort};
use crate::domain::{OrderRepository, RepositoryError};

/// Phase of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting on the order source.
    Fetching,
    /// Writing the fetched batch.
    Storing,
    /// Run finished (the store step may still have failed).
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => write!(f, "FETCHING"),
            Self::Storing => write!(f, "STORING"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// What happened to the fetched batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Every order was inserted.
    Stored {
        /// Rows inserted.
        rows: usize,
    },
    /// The source returned no orders; the repository was not called.
    Skipped,
    /// The batch was rolled back.
    Failed(RepositoryError),
}

/// Result of a run that got past the fetch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Orders returned by the source.
    pub fetched: usize,
    /// Store step result.
    pub store: StoreOutcome,
    /// Terminal state of the run.
    pub state: SyncState,
}

impl SyncReport {
    /// Whether the fetched batch is fully persisted (or there was nothing to
    /// persist).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self.store, StoreOutcome::Failed(_))
    }
}

/// Errors that end a sync run before the store step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The order source failed; nothing was stored.
    #[error("order fetch failed: {0}")]
    Fetch(#[from] OrderSourceError),
}

/// Use case wiring an order source to an order repository.
pub struct SyncService<S, R>
where
    S: OrderSourcePort,
    R: OrderRepository,
{
    source: Arc<S>,
    repository: Arc<R>,
}

impl<S, R> SyncService<S, R>
where
    S: OrderSourcePort,
    R: OrderRepository,
{
    /// Create a new `SyncService`.
    pub const fn new(source: Arc<S>, repository: Arc<R>) -> Self {
        Self { source, repository }
    }

    /// Run one fetch-then-store cycle.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Fetch` if the order source fails. Store failures
    /// are reported through `SyncReport::store` instead.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        tracing::info!(state = %SyncState::Fetching, "Fetching orders");

        let orders = self.source.fetch_orders().await.map_err(|e| {
            tracing::error!(state = %SyncState::Fetching, error = %e, "Order fetch failed");
            SyncError::Fetch(e)
        })?;

        let fetched = orders.len();
        tracing::info!(state = %SyncState::Storing, fetched, "Storing orders");

        let store = if orders.is_empty() {
            tracing::info!("No orders returned, skipping insert");
            StoreOutcome::Skipped
        } else {
            match self.repository.insert_batch(&orders).await {
                Ok(rows) => StoreOutcome::Stored { rows },
                Err(e) => {
                    tracing::error!(
                        state = %SyncState::Storing,
                        error = %e,
                        fetched,
                        "Order batch was not stored"
                    );
                    StoreOutcome::Failed(e)
                }
            }
        };

        tracing::info!(state = %SyncState::Done, fetched, ?store, "Sync finished");

        Ok(SyncReport {
            fetched,
            store,
            state: SyncState::Done,
        })
    }
}
