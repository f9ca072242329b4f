// gigflow/src/store.rs

//! The in-memory Order Record Store.
//!
//! `OrderStore` is a cheap-to-clone handle (`Arc<RwLock<..>>`) in the same way
//! the workflow shares it with read-only consumers such as the view.
//!
//! IMPORTANT: lock guards are blocking and MUST NOT be held across `.await`
//! suspension points. Every method here takes and releases the lock internally.
//!
//! Writes (`insert`, `replace`, `reset`) are crate-private: outside this crate
//! the store is read-only and records change only through
//! [`OrderWorkflow`](crate::OrderWorkflow).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

use crate::core::order::{Order, OrderId};
use crate::error::{OrderError, OrderResult};

#[derive(Debug, Default)]
struct Records {
  /// Insertion order is the display order.
  orders: Vec<Order>,
  index: HashMap<OrderId, usize>,
}

/// Shared, insertion-ordered order records.
///
/// Callers outside the crate can read but not write:
///
/// ```compile_fail
/// use gigflow::{InMemoryBackend, Order, OrderStatus, OrderWorkflow, WorkflowConfig};
/// use std::sync::Arc;
///
/// let workflow = OrderWorkflow::new(Arc::new(InMemoryBackend::new()), WorkflowConfig::default());
/// let due = chrono::NaiveDate::from_ymd_opt(2030, 1, 31).unwrap();
/// let forged = Order::new("Marie Dupont", "Logo", due, 100).with_status(OrderStatus::Completed);
/// workflow.store().replace(forged.id, forged).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct OrderStore(Arc<RwLock<Records>>);

impl OrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a store from existing records. Later duplicates of an id are rejected.
  pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> OrderResult<Self> {
    let store = Self::new();
    for order in orders {
      store.insert(order)?;
    }
    Ok(store)
  }

  pub fn list(&self) -> Vec<Order> {
    self.0.read().orders.clone()
  }

  pub fn get(&self, id: OrderId) -> Option<Order> {
    let guard = self.0.read();
    guard.index.get(&id).map(|&idx| guard.orders[idx].clone())
  }

  /// Runs `f` against the records under a read lock, without cloning them.
  pub fn with_orders<R>(&self, f: impl FnOnce(&[Order]) -> R) -> R {
    f(&self.0.read().orders)
  }

  pub(crate) fn insert(&self, order: Order) -> OrderResult<()> {
    let mut guard = self.0.write();
    if guard.index.contains_key(&order.id) {
      return Err(OrderError::Duplicate { id: order.id });
    }
    let idx = guard.orders.len();
    guard.index.insert(order.id, idx);
    guard.orders.push(order);
    Ok(())
  }

  /// Overwrites the record with `id` in place and returns the previous record.
  pub(crate) fn replace(&self, id: OrderId, new_order: Order) -> OrderResult<Order> {
    if new_order.id != id {
      return Err(OrderError::Internal(format!(
        "replacement record carries id {} but targets {}",
        new_order.id, id
      )));
    }
    let mut guard = self.0.write();
    let idx = match guard.index.get(&id) {
      Some(&idx) => idx,
      None => {
        event!(Level::WARN, order_id = %id, "Replace targeted an unknown order.");
        return Err(OrderError::NotFound { id });
      }
    };
    Ok(std::mem::replace(&mut guard.orders[idx], new_order))
  }

  /// Drops every record and loads `orders` instead, keeping their order.
  pub(crate) fn reset(&self, orders: Vec<Order>) -> OrderResult<()> {
    let mut index = HashMap::with_capacity(orders.len());
    for (idx, order) in orders.iter().enumerate() {
      if index.insert(order.id, idx).is_some() {
        return Err(OrderError::Duplicate { id: order.id });
      }
    }
    *self.0.write() = Records { orders, index };
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.0.read().orders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Clone for OrderStore {
  fn clone(&self) -> Self {
    OrderStore(Arc::clone(&self.0))
  }
}
