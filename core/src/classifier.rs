// gigflow/src/classifier.rs

//! Status Classifier: which dashboard tab an order belongs to.
//!
//! Status tabs partition orders by their *effective* status. The `Priority`
//! tab is orthogonal and only looks at the priority flag, so an order can
//! show up there and in its status tab at the same time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::order::Order;
use crate::core::status::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderTab {
  Priority,
  Active,
  Late,
  Revision,
  Delivered,
  Completed,
  Cancelled,
}

impl OrderTab {
  pub const ALL: [OrderTab; 7] = [
    OrderTab::Priority,
    OrderTab::Active,
    OrderTab::Late,
    OrderTab::Revision,
    OrderTab::Delivered,
    OrderTab::Completed,
    OrderTab::Cancelled,
  ];

  pub fn id(&self) -> &'static str {
    match self {
      OrderTab::Priority => "priority",
      OrderTab::Active => "active",
      OrderTab::Late => "late",
      OrderTab::Revision => "revision",
      OrderTab::Delivered => "delivered",
      OrderTab::Completed => "completed",
      OrderTab::Cancelled => "cancelled",
    }
  }

  /// Label shown on the freelancer dashboard.
  pub fn label(&self) -> &'static str {
    match self {
      OrderTab::Priority => "Priorité",
      OrderTab::Active => "En cours",
      OrderTab::Late => "En retard",
      OrderTab::Revision => "Révision",
      OrderTab::Delivered => "Livrées",
      OrderTab::Completed => "Terminées",
      OrderTab::Cancelled => "Annulées",
    }
  }

  /// The status a status tab selects on; `None` for `Priority`.
  pub fn status(&self) -> Option<OrderStatus> {
    match self {
      OrderTab::Priority => None,
      OrderTab::Active => Some(OrderStatus::Active),
      OrderTab::Late => Some(OrderStatus::Late),
      OrderTab::Revision => Some(OrderStatus::Revision),
      OrderTab::Delivered => Some(OrderStatus::Delivered),
      OrderTab::Completed => Some(OrderStatus::Completed),
      OrderTab::Cancelled => Some(OrderStatus::Cancelled),
    }
  }
}

impl From<OrderStatus> for OrderTab {
  fn from(status: OrderStatus) -> Self {
    match status {
      OrderStatus::Active => OrderTab::Active,
      OrderStatus::Late => OrderTab::Late,
      OrderStatus::Revision => OrderTab::Revision,
      OrderStatus::Delivered => OrderTab::Delivered,
      OrderStatus::Completed => OrderTab::Completed,
      OrderStatus::Cancelled => OrderTab::Cancelled,
    }
  }
}

impl fmt::Display for OrderTab {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab '{0}'")]
pub struct UnknownTab(pub String);

fn fold_accents(s: &str) -> String {
  s.trim()
    .chars()
    .flat_map(char::to_lowercase)
    .map(|c| match c {
      'é' | 'è' | 'ê' | 'ë' => 'e',
      'à' | 'â' => 'a',
      'î' | 'ï' => 'i',
      'ô' => 'o',
      'ù' | 'û' | 'ü' => 'u',
      'ç' => 'c',
      other => other,
    })
    .collect()
}

impl FromStr for OrderTab {
  type Err = UnknownTab;

  /// Accepts the tab id (`"revision"`) or its dashboard label (`"Révision"`),
  /// case-insensitively and with or without accents.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = fold_accents(s);
    OrderTab::ALL
      .into_iter()
      .find(|tab| tab.id() == wanted || fold_accents(tab.label()) == wanted)
      .ok_or_else(|| UnknownTab(s.to_string()))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
  /// Classify active orders past their due date as late.
  pub derive_late: bool,
}

impl Default for Classifier {
  fn default() -> Self {
    Self { derive_late: true }
  }
}

impl Classifier {
  pub fn new(derive_late: bool) -> Self {
    Self { derive_late }
  }

  /// The status used for tab membership. Only `Active` ever differs from the
  /// stored status: it reads as `Late` once the due date has passed.
  pub fn effective_status(&self, order: &Order, today: NaiveDate) -> OrderStatus {
    if self.derive_late && order.status == OrderStatus::Active && order.due_date < today {
      OrderStatus::Late
    } else {
      order.status
    }
  }

  pub fn matches(&self, tab: OrderTab, order: &Order, today: NaiveDate) -> bool {
    match tab.status() {
      None => order.priority,
      Some(status) => self.effective_status(order, today) == status,
    }
  }

  /// The single status tab an order belongs to.
  pub fn status_tab(&self, order: &Order, today: NaiveDate) -> OrderTab {
    self.effective_status(order, today).into()
  }
}
