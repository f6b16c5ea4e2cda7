// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Order Sync - MoySklad customer orders into PostgreSQL
//!
//! One run fetches the first page of customer orders from the MoySklad JSON
//! API and writes all of them to the `orders` table in a single transaction.
//!
//! # Architecture (Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: the `Order` record and the `OrderRepository` port
//! - **Application**: the `OrderSourcePort` port and `SyncService`
//!   (`Fetching -> Storing -> Done`)
//! - **Infrastructure**: adapters
//!   - `moysklad`: HTTP client for the customer order listing
//!   - `persistence`: PostgreSQL and in-memory repositories
//!
//! Configuration (`config`) and log setup (`observability`) sit beside the
//! layers and are only wired together in the binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - the order record and its persistence port.
pub mod domain;

/// Application layer - sync use case and the order source port.
pub mod application;

/// Infrastructure layer - MoySklad and database adapters.
pub mod infrastructure;

/// YAML configuration with environment interpolation.
pub mod config;

/// Tracing subscriber setup.
pub mod observability;

// Domain re-exports
pub use domain::{Order, OrderRepository, RawResponse, RepositoryError};

// Application re-exports
pub use application::ports::{OrderSourceError, OrderSourcePort};
pub use application::{StoreOutcome, SyncError, SyncReport, SyncService, SyncState};

// Infrastructure re-exports
pub use infrastructure::moysklad::{MoySkladConfig, MoySkladError, MoySkladOrderClient};
pub use infrastructure::persistence::{InMemoryOrderRepository, PostgresOrderRepository};

// Config re-exports
pub use config::{Config, ConfigError, load_config};
