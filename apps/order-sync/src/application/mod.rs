//! Application layer: the order source port and the sync use case.

pub mod ports;
pub mod sync_service;

pub use sync_service::{StoreOutcome, SyncError, SyncReport, SyncService, SyncState};
