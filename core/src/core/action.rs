// gigflow/src/core/action.rs

//! Actions that can be requested on an order and the roles requesting them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::attachment::AttachmentRef;
use crate::core::status::OrderStatus;

/// A requested change to an order, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderAction {
  /// Hand in work. Acts as a re-delivery when the order is in `revision`.
  Deliver {
    message: String,
    #[serde(default)]
    attachments: Vec<AttachmentRef>,
  },
  /// The client asks for changes on a delivered order.
  RequestRevision { message: String },
  MarkCompleted,
  Cancel { reason: String },
}

impl OrderAction {
  pub fn deliver(message: impl Into<String>) -> Self {
    OrderAction::Deliver {
      message: message.into(),
      attachments: Vec::new(),
    }
  }

  pub fn request_revision(message: impl Into<String>) -> Self {
    OrderAction::RequestRevision { message: message.into() }
  }

  pub fn cancel(reason: impl Into<String>) -> Self {
    OrderAction::Cancel { reason: reason.into() }
  }

  /// Resolves the kind of this action against the status it would be applied to.
  /// Delivering an order that is in `revision` is a re-delivery.
  pub fn kind_for(&self, from: OrderStatus) -> ActionKind {
    match self {
      OrderAction::Deliver { .. } if from == OrderStatus::Revision => ActionKind::Redeliver,
      OrderAction::Deliver { .. } => ActionKind::Deliver,
      OrderAction::RequestRevision { .. } => ActionKind::RequestRevision,
      OrderAction::MarkCompleted => ActionKind::MarkCompleted,
      OrderAction::Cancel { .. } => ActionKind::Cancel,
    }
  }

  pub fn attachments(&self) -> &[AttachmentRef] {
    match self {
      OrderAction::Deliver { attachments, .. } => attachments,
      _ => &[],
    }
  }
}

/// Fieldless tag of an [`OrderAction`], used in errors, events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
  Create,
  Deliver,
  Redeliver,
  RequestRevision,
  MarkCompleted,
  Cancel,
  /// Snapshot taken when an order is hydrated from the backend.
  Load,
}

impl fmt::Display for ActionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ActionKind::Create => "create",
      ActionKind::Deliver => "deliver",
      ActionKind::Redeliver => "re-deliver",
      ActionKind::RequestRevision => "request changes on",
      ActionKind::MarkCompleted => "complete",
      ActionKind::Cancel => "cancel",
      ActionKind::Load => "load",
    })
  }
}

/// Role of whoever triggers an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
  Freelancer,
  Client,
  Admin,
}

impl Actor {
  /// Authorization table for every transition.
  pub fn may(&self, kind: ActionKind) -> bool {
    match kind {
      ActionKind::Deliver | ActionKind::Redeliver => matches!(self, Actor::Freelancer),
      ActionKind::RequestRevision => matches!(self, Actor::Client),
      ActionKind::MarkCompleted => matches!(self, Actor::Freelancer | Actor::Client),
      ActionKind::Cancel => matches!(self, Actor::Client | Actor::Admin),
      // Orders arrive from checkout; any role may register one.
      ActionKind::Create => true,
      // Loading is an operator task run at startup or after a conflict.
      ActionKind::Load => matches!(self, Actor::Admin),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Actor::Freelancer => "freelancer",
      Actor::Client => "client",
      Actor::Admin => "admin",
    }
  }
}

impl fmt::Display for Actor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown actor '{0}' (expected freelancer, client or admin)")]
pub struct UnknownActor(pub String);

impl FromStr for Actor {
  type Err = UnknownActor;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "freelancer" => Ok(Actor::Freelancer),
      "client" => Ok(Actor::Client),
      "admin" => Ok(Actor::Admin),
      _ => Err(UnknownActor(s.to_string())),
    }
  }
}
