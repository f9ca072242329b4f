// gigflow/src/core/status.rs

//! The closed set of statuses an order can be stored with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored lifecycle status of an [`Order`](crate::Order).
///
/// `Completed` and `Cancelled` are terminal: the state machine defines no
/// transition out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Active,
  Late,
  Revision,
  Delivered,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Active,
    OrderStatus::Late,
    OrderStatus::Revision,
    OrderStatus::Delivered,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Active => "active",
      OrderStatus::Late => "late",
      OrderStatus::Revision => "revision",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
  }

  /// Statuses from which the freelancer can hand in work.
  pub fn accepts_delivery(&self) -> bool {
    matches!(self, OrderStatus::Active | OrderStatus::Late | OrderStatus::Revision)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}
