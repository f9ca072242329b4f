// gigflow/src/workflow.rs

//! Contains `OrderWorkflow`, the only component allowed to mutate orders.
//!
//! Every mutation follows the same path:
//!  1. read the current record from the [`OrderStore`],
//!  2. run the pure state machine ([`attempt_transition`]),
//!  3. check attachments against the [`AttachmentPolicy`](crate::AttachmentPolicy),
//!  4. persist through the [`OrderBackend`] with the record's version as token,
//!  5. only then overwrite the store, append to the [`EventLog`] and run hooks.
//!
//! A failure at any step leaves the store and the log untouched.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::attachment::AttachmentRef;
use crate::backend::{OrderBackend, OrderFilter};
use crate::classifier::{Classifier, OrderTab};
use crate::config::WorkflowConfig;
use crate::core::action::{Actor, OrderAction};
use crate::core::clock::{Clock, SystemClock};
use crate::core::order::{Order, OrderId};
use crate::core::status::OrderStatus;
use crate::error::{OrderError, OrderResult};
use crate::events::{EventLog, OrderEvent};
use crate::store::OrderStore;
use crate::transition::attempt_transition;
use crate::view::{self, OrderQuery};

/// Callback run after every accepted change, in registration order.
pub type TransitionHook = Box<dyn Fn(&OrderEvent) + Send + Sync>;

pub struct OrderWorkflow {
  store: OrderStore,
  backend: Arc<dyn OrderBackend>,
  events: EventLog,
  clock: Arc<dyn Clock>,
  config: WorkflowConfig,
  classifier: Classifier,
  hooks: Vec<TransitionHook>,
}

impl OrderWorkflow {
  pub fn new(backend: Arc<dyn OrderBackend>, config: WorkflowConfig) -> Self {
    let classifier = config.classifier();
    Self {
      store: OrderStore::new(),
      backend,
      events: EventLog::new(),
      clock: Arc::new(SystemClock),
      config,
      classifier,
      hooks: Vec::new(),
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Registers a hook run after each accepted change.
  pub fn on_transition(&mut self, hook: impl Fn(&OrderEvent) + Send + Sync + 'static) {
    self.hooks.push(Box::new(hook));
    event!(Level::DEBUG, hooks = self.hooks.len(), "Transition hook registered.");
  }

  pub fn store(&self) -> &OrderStore {
    &self.store
  }

  pub fn events(&self) -> &EventLog {
    &self.events
  }

  pub fn config(&self) -> &WorkflowConfig {
    &self.config
  }

  pub fn classifier(&self) -> &Classifier {
    &self.classifier
  }

  pub fn today(&self) -> NaiveDate {
    self.clock.today()
  }

  /// Replaces the store's content with every order the backend holds.
  ///
  /// Each order whose version the event log does not already end on gets a
  /// `Loaded` snapshot, so `history` and `rebuild` work for orders created
  /// before this process started. Hooks are not run for snapshots.
  #[instrument(name = "OrderWorkflow::load", skip_all, err(Display))]
  pub async fn load(&self) -> OrderResult<usize> {
    let orders = self.backend.list(&OrderFilter::default()).await?;
    let count = orders.len();
    self.store.reset(orders.clone())?;

    let now = self.clock.now();
    let mut snapshots = 0;
    for order in &orders {
      if self.events.last_version(order.id) != Some(order.version) {
        self.events.record_loaded(order, now);
        snapshots += 1;
      }
    }
    event!(Level::INFO, count, snapshots, "Orders loaded from backend.");
    Ok(count)
  }

  /// Registers a freshly purchased order.
  #[instrument(
    name = "OrderWorkflow::create",
    skip_all,
    fields(order_id = %order.id, %actor),
    err(Display)
  )]
  pub async fn create(&self, order: Order, actor: Actor) -> OrderResult<Order> {
    validate_new_order(&order)?;
    if self.store.get(order.id).is_some() {
      return Err(OrderError::Duplicate { id: order.id });
    }

    let now = self.clock.now();
    let order = Order {
      version: 0,
      updated_at: now,
      ..order
    };
    let stored = self.backend.create(&order).await?;
    self.store.insert(stored.clone())?;

    let recorded = self.events.record_created(&stored, actor, now);
    self.run_hooks(&recorded);
    event!(Level::INFO, client = %stored.client, "Order created.");
    Ok(stored)
  }

  /// Applies `action` on behalf of `actor`. The single mutation path for orders.
  #[instrument(
    name = "OrderWorkflow::apply",
    skip_all,
    fields(order_id = %id, %actor, action = tracing::field::Empty),
    err(Display)
  )]
  pub async fn apply(&self, id: OrderId, action: OrderAction, actor: Actor) -> OrderResult<Order> {
    let current = self.store.get(id).ok_or(OrderError::NotFound { id })?;
    let kind = action.kind_for(current.status);
    tracing::Span::current().record("action", tracing::field::display(kind));

    let stamp = self.clock.stamp();
    let next = match attempt_transition(&current, &action, actor, stamp) {
      Ok(next) => next,
      Err(rejection) => {
        event!(Level::WARN, from = %current.status, error = %rejection, "Transition rejected.");
        return Err(rejection.into());
      }
    };

    // Files are only judged once the actor and the move itself are accepted.
    for attachment in action.attachments() {
      self.config.attachment_policy.check_ref(attachment)?;
    }

    // Persist first: the store only ever reflects acknowledged writes.
    let persisted = self.backend.update(id, &next, current.version).await?;
    self.store.replace(id, persisted.clone())?;

    let recorded = self
      .events
      .record_transition(&current, &persisted, &action, actor, stamp.now);
    self.run_hooks(&recorded);

    event!(
      Level::INFO,
      from = %current.status,
      to = %persisted.status,
      version = persisted.version,
      "Order transitioned."
    );
    Ok(persisted)
  }

  /// Freelancer hands in work; re-delivers if the order is in revision.
  pub async fn deliver(
    &self,
    id: OrderId,
    message: impl Into<String>,
    attachments: Vec<AttachmentRef>,
  ) -> OrderResult<Order> {
    let action = OrderAction::Deliver {
      message: message.into(),
      attachments,
    };
    self.apply(id, action, Actor::Freelancer).await
  }

  /// Client asks for changes on a delivered order.
  pub async fn request_revision(&self, id: OrderId, message: impl Into<String>) -> OrderResult<Order> {
    self
      .apply(id, OrderAction::request_revision(message), Actor::Client)
      .await
  }

  pub async fn mark_completed(&self, id: OrderId, actor: Actor) -> OrderResult<Order> {
    self.apply(id, OrderAction::MarkCompleted, actor).await
  }

  pub async fn cancel(&self, id: OrderId, actor: Actor, reason: impl Into<String>) -> OrderResult<Order> {
    self.apply(id, OrderAction::cancel(reason), actor).await
  }

  // --- Read side ---

  pub fn get(&self, id: OrderId) -> OrderResult<Order> {
    self.store.get(id).ok_or(OrderError::NotFound { id })
  }

  pub fn list(&self) -> Vec<Order> {
    self.store.list()
  }

  /// Orders matching `query`; a query without a sort uses the configured default.
  pub fn view(&self, query: &OrderQuery) -> Vec<Order> {
    let today = self.today();
    let query = OrderQuery {
      sort: Some(query.sort.unwrap_or(self.config.default_sort)),
      ..query.clone()
    };
    self
      .store
      .with_orders(|orders| view::visible_orders(orders, &query, &self.classifier, today))
  }

  pub fn tab_counts(&self) -> BTreeMap<OrderTab, usize> {
    let today = self.today();
    self
      .store
      .with_orders(|orders| view::tab_counts(orders, &self.classifier, today))
  }

  pub fn history(&self, id: OrderId) -> OrderResult<Vec<OrderEvent>> {
    if self.store.get(id).is_none() {
      return Err(OrderError::NotFound { id });
    }
    Ok(self.events.history(id))
  }

  fn run_hooks(&self, recorded: &OrderEvent) {
    for (idx, hook) in self.hooks.iter().enumerate() {
      event!(Level::TRACE, hook_index = idx, seq = recorded.seq, "Running transition hook.");
      hook(recorded);
    }
  }
}

fn validate_new_order(order: &Order) -> OrderResult<()> {
  if order.client.trim().is_empty() {
    return Err(OrderError::Invalid {
      field: "client",
      message: "client name is empty".to_string(),
    });
  }
  if order.service.trim().is_empty() {
    return Err(OrderError::Invalid {
      field: "service",
      message: "service description is empty".to_string(),
    });
  }
  if order.status != OrderStatus::Active {
    return Err(OrderError::Invalid {
      field: "status",
      message: format!("new orders start active, got '{}'", order.status),
    });
  }
  if order.delivered_date.is_some() || order.revision_count != 0 || order.cancellation_reason.is_some() {
    return Err(OrderError::Invalid {
      field: "order",
      message: "new orders carry no delivery, revision or cancellation data".to_string(),
    });
  }
  Ok(())
}
