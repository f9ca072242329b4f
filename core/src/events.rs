// gigflow/src/events.rs

//! Append-only history of everything the workflow accepted.
//!
//! The store only keeps the latest version of each order. The event log keeps
//! how it got there, and [`rebuild`] folds the events of one order back into
//! its current record.
//!
//! The log lives in memory. Orders hydrated from a backend enter it as a
//! `Loaded` snapshot, and replay of such an order starts from its latest snapshot.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::action::{ActionKind, Actor, OrderAction};
use crate::core::clock::Stamp;
use crate::core::order::{Order, OrderId};
use crate::core::status::OrderStatus;
use crate::error::{OrderError, OrderResult};
use crate::transition::attempt_transition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
  /// Snapshot of the order as it entered the system.
  Created(Order),
  /// Snapshot of the order as read back from the backend.
  Loaded(Order),
  Transitioned(OrderAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
  /// Position in the log, starting at 1.
  pub seq: u64,
  pub order_id: OrderId,
  pub actor: Actor,
  pub kind: ActionKind,
  pub from: Option<OrderStatus>,
  pub to: OrderStatus,
  /// Order version after the event.
  pub version: u64,
  pub at: DateTime<Utc>,
  pub payload: EventPayload,
}

#[derive(Debug, Default)]
pub struct EventLog(Arc<RwLock<Vec<OrderEvent>>>);

impl EventLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn record_created(&self, order: &Order, actor: Actor, at: DateTime<Utc>) -> OrderEvent {
    self.push(|seq| OrderEvent {
      seq,
      order_id: order.id,
      actor,
      kind: ActionKind::Create,
      from: None,
      to: order.status,
      version: order.version,
      at,
      payload: EventPayload::Created(order.clone()),
    })
  }

  /// Loads run with operator rights, so the snapshot is attributed to `Admin`.
  pub(crate) fn record_loaded(&self, order: &Order, at: DateTime<Utc>) -> OrderEvent {
    self.push(|seq| OrderEvent {
      seq,
      order_id: order.id,
      actor: Actor::Admin,
      kind: ActionKind::Load,
      from: None,
      to: order.status,
      version: order.version,
      at,
      payload: EventPayload::Loaded(order.clone()),
    })
  }

  /// Version of `id` after its most recent event, if the log knows the order.
  pub(crate) fn last_version(&self, id: OrderId) -> Option<u64> {
    self
      .0
      .read()
      .iter()
      .rev()
      .find(|e| e.order_id == id)
      .map(|e| e.version)
  }

  pub(crate) fn record_transition(
    &self,
    before: &Order,
    after: &Order,
    action: &OrderAction,
    actor: Actor,
    at: DateTime<Utc>,
  ) -> OrderEvent {
    self.push(|seq| OrderEvent {
      seq,
      order_id: after.id,
      actor,
      kind: action.kind_for(before.status),
      from: Some(before.status),
      to: after.status,
      version: after.version,
      at,
      payload: EventPayload::Transitioned(action.clone()),
    })
  }

  fn push(&self, build: impl FnOnce(u64) -> OrderEvent) -> OrderEvent {
    let mut guard = self.0.write();
    let event = build(guard.len() as u64 + 1);
    guard.push(event.clone());
    event
  }

  pub fn all(&self) -> Vec<OrderEvent> {
    self.0.read().clone()
  }

  /// Events of one order, oldest first.
  pub fn history(&self, id: OrderId) -> Vec<OrderEvent> {
    self.0.read().iter().filter(|e| e.order_id == id).cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.0.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Clone for EventLog {
  fn clone(&self) -> Self {
    EventLog(Arc::clone(&self.0))
  }
}

/// Folds the events of order `id` back into its current record.
///
/// The first event for the order must be its `Created` or `Loaded` snapshot; a
/// later `Loaded` snapshot replaces the state folded so far. Every transition
/// is re-run through the state machine with its recorded actor and time, so a
/// log that could not have been produced by the workflow is rejected.
pub fn rebuild(id: OrderId, events: &[OrderEvent]) -> OrderResult<Order> {
  let mut relevant = events.iter().filter(|e| e.order_id == id);

  let mut current = match relevant.next() {
    Some(OrderEvent {
      payload: EventPayload::Created(order) | EventPayload::Loaded(order),
      ..
    }) => order.clone(),
    Some(other) => {
      return Err(OrderError::Internal(format!(
        "history of order {} starts with event #{} instead of a snapshot",
        id, other.seq
      )))
    }
    None => return Err(OrderError::NotFound { id }),
  };

  for event in relevant {
    match &event.payload {
      EventPayload::Transitioned(action) => {
        current = attempt_transition(&current, action, event.actor, Stamp::at(event.at))?;
      }
      EventPayload::Loaded(order) => current = order.clone(),
      EventPayload::Created(_) => {
        return Err(OrderError::Internal(format!(
          "order {} is created twice (event #{})",
          id, event.seq
        )))
      }
    }
  }
  Ok(current)
}
