// gigflow/src/view.rs

//! Filtering & Search View: the visible subset of orders for a dashboard tab.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::classifier::{Classifier, OrderTab};
use crate::core::order::Order;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
  /// Keep the store's insertion order.
  #[default]
  Insertion,
  /// Most recently updated first, the way conversations are listed.
  RecentFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort '{0}' (expected insertion or recent)")]
pub struct UnknownSort(pub String);

impl FromStr for OrderSort {
  type Err = UnknownSort;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "insertion" | "" => Ok(OrderSort::Insertion),
      "recent" | "recent_first" => Ok(OrderSort::RecentFirst),
      _ => Err(UnknownSort(s.to_string())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
  pub tab: OrderTab,
  /// Matched case-insensitively as a substring of the client name.
  pub search: String,
  /// `None` defers to the caller's default: `Insertion` for [`visible_orders`],
  /// [`WorkflowConfig::default_sort`](crate::WorkflowConfig) for `OrderWorkflow::view`.
  pub sort: Option<OrderSort>,
}

impl OrderQuery {
  pub fn tab(tab: OrderTab) -> Self {
    Self {
      tab,
      search: String::new(),
      sort: None,
    }
  }

  pub fn with_search(mut self, search: impl Into<String>) -> Self {
    self.search = search.into();
    self
  }

  pub fn with_sort(mut self, sort: OrderSort) -> Self {
    self.sort = Some(sort);
    self
  }
}

fn client_matches(order: &Order, needle: &str) -> bool {
  needle.is_empty() || order.client.to_lowercase().contains(needle)
}

/// Orders of `query.tab` whose client matches `query.search`.
///
/// With `OrderSort::Insertion` surviving orders keep their relative order, so
/// adding a search term can only remove entries, never reorder them.
pub fn visible_orders(orders: &[Order], query: &OrderQuery, classifier: &Classifier, today: NaiveDate) -> Vec<Order> {
  let needle = query.search.trim().to_lowercase();
  let mut visible: Vec<Order> = orders
    .iter()
    .filter(|order| classifier.matches(query.tab, order, today) && client_matches(order, &needle))
    .cloned()
    .collect();

  if query.sort.unwrap_or_default() == OrderSort::RecentFirst {
    // Stable, so equal timestamps keep insertion order.
    visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
  }
  visible
}

/// Badge count for every tab, including empty ones.
pub fn tab_counts(orders: &[Order], classifier: &Classifier, today: NaiveDate) -> BTreeMap<OrderTab, usize> {
  let mut counts: BTreeMap<OrderTab, usize> = OrderTab::ALL.into_iter().map(|tab| (tab, 0)).collect();
  for order in orders {
    *counts.entry(classifier.status_tab(order, today)).or_default() += 1;
    if order.priority {
      *counts.entry(OrderTab::Priority).or_default() += 1;
    }
  }
  counts
}
