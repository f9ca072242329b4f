// gigflow/src/core/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::attachment::AttachmentRef;
use crate::core::status::OrderStatus;

/// Identifier of an order, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
  pub fn new() -> Self {
    OrderId(Uuid::new_v4())
  }
}

impl Default for OrderId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for OrderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for OrderId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s.trim()).map(OrderId)
  }
}

impl From<Uuid> for OrderId {
  fn from(id: Uuid) -> Self {
    OrderId(id)
  }
}

/// One purchased unit of freelance work.
///
/// Records are overwritten in place by the workflow; the history of how a
/// record got to its current shape lives in the [`EventLog`](crate::EventLog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
  pub id: OrderId,
  pub client: String,
  pub service: String,
  pub due_date: NaiveDate,
  /// Date of the most recent delivery. Never cleared once set.
  pub delivered_date: Option<NaiveDate>,
  pub total_cents: u64,
  pub status: OrderStatus,
  pub priority: bool,
  pub note: Option<String>,
  /// Message accompanying the most recent delivery, empty until then.
  pub delivery_message: String,
  pub revision_message: Option<String>,
  /// Present exactly when `status` is `Cancelled`.
  pub cancellation_reason: Option<String>,
  pub revision_count: u32,
  #[serde(default)]
  pub attachments: Vec<AttachmentRef>,
  /// Bumped by every accepted transition; used as an optimistic-concurrency token.
  pub version: u64,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// A freshly purchased order, as it arrives from checkout.
  pub fn new(client: impl Into<String>, service: impl Into<String>, due_date: NaiveDate, total_cents: u64) -> Self {
    Self {
      id: OrderId::new(),
      client: client.into(),
      service: service.into(),
      due_date,
      delivered_date: None,
      total_cents,
      status: OrderStatus::Active,
      priority: false,
      note: None,
      delivery_message: String::new(),
      revision_message: None,
      cancellation_reason: None,
      revision_count: 0,
      attachments: Vec::new(),
      version: 0,
      updated_at: Utc::now(),
    }
  }

  pub fn with_id(mut self, id: OrderId) -> Self {
    self.id = id;
    self
  }

  pub fn with_priority(mut self, priority: bool) -> Self {
    self.priority = priority;
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  pub fn with_status(mut self, status: OrderStatus) -> Self {
    self.status = status;
    self
  }

  pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
    self.updated_at = updated_at;
    self
  }
}
