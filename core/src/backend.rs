// gigflow/src/backend.rs

//! Defines the `OrderBackend` trait, the persistence seam of the workflow,
//! and `InMemoryBackend`, its reference implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::core::order::{Order, OrderId};
use crate::core::status::OrderStatus;
use crate::error::{OrderError, OrderResult};

/// Server-side selection for [`OrderBackend::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
  pub status: Option<OrderStatus>,
  /// Case-insensitive substring of the client name.
  pub client: Option<String>,
}

impl OrderFilter {
  pub fn accepts(&self, order: &Order) -> bool {
    if let Some(status) = self.status {
      if order.status != status {
        return false;
      }
    }
    match &self.client {
      Some(needle) if !needle.trim().is_empty() => order
        .client
        .to_lowercase()
        .contains(&needle.trim().to_lowercase()),
      _ => true,
    }
  }
}

/// Durable home of order records.
///
/// Implementations must reject an `update` whose `expected_version` differs
/// from the stored version with [`OrderError::Conflict`], so two sessions
/// editing the same order cannot silently overwrite each other.
/// Foreign errors (database, network) are reported as [`OrderError::Backend`].
#[async_trait]
pub trait OrderBackend: Send + Sync + 'static {
  async fn create(&self, order: &Order) -> OrderResult<Order>;

  async fn read(&self, id: OrderId) -> OrderResult<Order>;

  async fn update(&self, id: OrderId, order: &Order, expected_version: u64) -> OrderResult<Order>;

  /// Matching orders in creation order.
  async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
  rows: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_orders(orders: Vec<Order>) -> Self {
    Self {
      rows: Arc::new(RwLock::new(orders)),
    }
  }

  pub fn len(&self) -> usize {
    self.rows.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl OrderBackend for InMemoryBackend {
  #[instrument(name = "InMemoryBackend::create", skip_all, fields(order_id = %order.id), err(Display))]
  async fn create(&self, order: &Order) -> OrderResult<Order> {
    let mut rows = self.rows.write();
    if rows.iter().any(|row| row.id == order.id) {
      return Err(OrderError::Duplicate { id: order.id });
    }
    rows.push(order.clone());
    event!(Level::TRACE, "Row inserted.");
    Ok(order.clone())
  }

  async fn read(&self, id: OrderId) -> OrderResult<Order> {
    self
      .rows
      .read()
      .iter()
      .find(|row| row.id == id)
      .cloned()
      .ok_or(OrderError::NotFound { id })
  }

  #[instrument(name = "InMemoryBackend::update", skip(self, order), fields(order_id = %id), err(Display))]
  async fn update(&self, id: OrderId, order: &Order, expected_version: u64) -> OrderResult<Order> {
    let mut rows = self.rows.write();
    let row = rows
      .iter_mut()
      .find(|row| row.id == id)
      .ok_or(OrderError::NotFound { id })?;
    if row.version != expected_version {
      return Err(OrderError::Conflict {
        id,
        expected: expected_version,
        found: row.version,
      });
    }
    *row = order.clone();
    event!(Level::TRACE, new_version = order.version, "Row updated.");
    Ok(order.clone())
  }

  async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>> {
    Ok(self.rows.read().iter().filter(|row| filter.accepts(row)).cloned().collect())
  }
}
