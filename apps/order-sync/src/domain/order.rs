//! Order value type.
//!
//! An `Order` is built once from a single row of the order list response,
//! never mutated, inserted once and dropped. The typed columns are a
//! projection of `raw_response`, which keeps the source row verbatim so the
//! projection can be re-derived later.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unmodified source document for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(Value);

impl RawResponse {
    /// Wrap a source document.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up a top-level field of the document.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// A customer order as stored in the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Source order id (primary key, stable across syncs).
    pub order_id: String,
    /// Owning account id.
    pub account_id: String,
    /// Creation moment as reported by the source.
    pub created: NaiveDateTime,
    /// Planned delivery moment.
    pub delivery_planned_moment: Option<NaiveDateTime>,
    /// External system code.
    pub external_code: Option<String>,
    /// Display name, e.g. `00042`.
    pub name: String,
    /// Paid amount, scale 2.
    pub payed_sum: Option<Decimal>,
    /// Free-text shipment address.
    pub shipment_address: Option<String>,
    /// The source row this order was mapped from.
    pub raw_response: RawResponse,
}
