//! In-memory order repository for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::{Order, OrderRepository, RepositoryError};

/// In-memory implementation of `OrderRepository`.
///
/// Keeps the same all-or-nothing contract as the PostgreSQL adapter: the
/// whole batch is checked for id conflicts before any order is inserted.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an order with this id is stored.
    #[must_use]
    pub fn contains(&self, order_id: &str) -> bool {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(order_id)
    }

    /// Fetch a stored order by id.
    #[must_use]
    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(order_id)
            .cloned()
    }

    /// Add an order directly (for test setup).
    pub fn add(&self, order: Order) {
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.order_id.clone(), order);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_batch(&self, orders: &[Order]) -> Result<usize, RepositoryError> {
        let mut stored = self.orders.write().unwrap_or_else(PoisonError::into_inner);

        let mut seen = HashSet::with_capacity(orders.len());
        for order in orders {
            if stored.contains_key(&order.order_id) || !seen.insert(order.order_id.as_str()) {
                tracing::warn!(
                    order_id = %order.order_id,
                    batch_size = orders.len(),
                    "Duplicate order id, batch rejected"
                );
                return Err(RepositoryError::DuplicateOrderId {
                    order_id: order.order_id.clone(),
                });
            }
        }

        for order in orders {
            stored.insert(order.order_id.clone(), order.clone());
        }

        Ok(orders.len())
    }
}
