//! Persistence Adapters
//!
//! Implementations of `OrderRepository`.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOrderRepository;
pub use postgres::{CREATE_ORDERS_TABLE, PostgresOrderRepository};
