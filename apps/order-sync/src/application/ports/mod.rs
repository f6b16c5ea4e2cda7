//! Application Ports
//!
//! Driven ports for the external systems the sync talks to. The order
//! repository port lives in the domain layer.

mod order_source_port;

pub use order_source_port::{OrderSourceError, OrderSourcePort};
