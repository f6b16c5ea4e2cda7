//! MoySklad order source adapter.
//!
//! Implements `OrderSourcePort` with a single authenticated GET against the
//! customer order listing. No pagination, no retries.

mod api_types;
mod client;
mod config;
mod error;

pub use api_types::TIMESTAMP_FORMAT;
pub use client::MoySkladOrderClient;
pub use config::{CUSTOMER_ORDER_PATH, DEFAULT_BASE_URL, MoySkladConfig};
pub use error::MoySkladError;
