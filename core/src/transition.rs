// gigflow/src/transition.rs

//! The order state machine.
//!
//! ```text
//!   active ──┐
//!            ├─ deliver ──▶ delivered ── mark completed ──▶ completed
//!   late ────┘                 │  ▲
//!                 request      │  │ re-deliver
//!                 changes      ▼  │ (revision_count += 1)
//!                            revision
//!
//!   any non-terminal ── cancel ──▶ cancelled
//! ```
//!
//! [`attempt_transition`] checks every guard itself (who may act, from which
//! status, with which payload) and never trusts the caller to only offer
//! legal actions.

use crate::core::action::{ActionKind, Actor, OrderAction};
use crate::core::clock::Stamp;
use crate::core::order::Order;
use crate::core::status::OrderStatus;
use crate::error::TransitionError;

/// Returns the trimmed message, or `EmptyMessage` if nothing is left.
fn required_text(text: &str, action: ActionKind) -> Result<String, TransitionError> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(TransitionError::EmptyMessage { action });
  }
  Ok(trimmed.to_string())
}

/// Target status of `kind` when applied from `from`, or `None` if the pair is illegal.
pub fn target_status(from: OrderStatus, kind: ActionKind) -> Option<OrderStatus> {
  use OrderStatus::*;
  match (from, kind) {
    (Active | Late, ActionKind::Deliver) => Some(Delivered),
    (Revision, ActionKind::Redeliver) => Some(Delivered),
    (Delivered, ActionKind::RequestRevision) => Some(Revision),
    (Delivered, ActionKind::MarkCompleted) => Some(Completed),
    (Active | Late | Revision | Delivered, ActionKind::Cancel) => Some(Cancelled),
    _ => None,
  }
}

/// Applies `action` by `actor` to `order`, returning the updated record.
///
/// The input is never modified; on `Err` the caller still holds the untouched
/// order. On success the returned record has its `version` bumped and
/// `updated_at` set to `stamp.now`.
pub fn attempt_transition(
  order: &Order,
  action: &OrderAction,
  actor: Actor,
  stamp: Stamp,
) -> Result<Order, TransitionError> {
  let kind = action.kind_for(order.status);

  if !actor.may(kind) {
    return Err(TransitionError::Forbidden { actor, action: kind });
  }
  let to = target_status(order.status, kind).ok_or(TransitionError::NotAllowed {
    from: order.status,
    action: kind,
  })?;

  let mut next = order.clone();
  match action {
    OrderAction::Deliver { message, attachments } => {
      next.delivery_message = required_text(message, kind)?;
      next.attachments = attachments.clone();
      next.delivered_date = Some(stamp.today);
      if kind == ActionKind::Redeliver {
        next.revision_count += 1;
        next.revision_message = None;
      }
    }
    OrderAction::RequestRevision { message } => {
      next.revision_message = Some(required_text(message, kind)?);
    }
    OrderAction::MarkCompleted => {}
    OrderAction::Cancel { reason } => {
      next.cancellation_reason = Some(required_text(reason, kind)?);
    }
  }

  next.status = to;
  next.version += 1;
  next.updated_at = stamp.now;
  Ok(next)
}

/// Actions `actor` could legally attempt on an order in `status`, ignoring payload.
/// Presentation layers use this to decide which buttons to offer.
pub fn available_actions(status: OrderStatus, actor: Actor) -> Vec<ActionKind> {
  [
    ActionKind::Deliver,
    ActionKind::Redeliver,
    ActionKind::RequestRevision,
    ActionKind::MarkCompleted,
    ActionKind::Cancel,
  ]
  .into_iter()
  .filter(|kind| actor.may(*kind) && target_status(status, *kind).is_some())
  .collect()
}
