//! Domain layer: the `Order` record and the persistence port it flows into.
//!
//! Nothing in here touches the network or the database.

pub mod order;
pub mod repository;

pub use order::{Order, RawResponse};
pub use repository::{OrderRepository, RepositoryError};
