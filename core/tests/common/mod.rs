// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gigflow::{
  FixedClock, InMemoryBackend, Order, OrderBackend, OrderError, OrderFilter, OrderId, OrderResult, OrderStatus,
  OrderWorkflow, Stamp, WorkflowConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Time ---

pub fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
  now().date_naive()
}

pub fn stamp() -> Stamp {
  Stamp::at(now())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Comfortably after `today()`, so active fixtures are never derived as late.
pub fn future_due() -> NaiveDate {
  date(2024, 6, 30)
}

// --- Orders ---

pub fn active_order(client: &str) -> Order {
  Order::new(client, "Logo design", future_due(), 15_000).with_updated_at(now() - chrono::Duration::days(10))
}

/// An order whose fields are consistent with having reached `status` through the workflow.
pub fn order_in(status: OrderStatus, client: &str) -> Order {
  let mut order = active_order(client).with_status(status);
  match status {
    OrderStatus::Active | OrderStatus::Late => {}
    OrderStatus::Revision => {
      order.delivered_date = Some(date(2024, 5, 10));
      order.delivery_message = "Première version".to_string();
      order.revision_message = Some("Pouvez-vous changer la couleur ?".to_string());
      order.revision_count = 1;
      order.version = 3;
    }
    OrderStatus::Delivered => {
      order.delivered_date = Some(date(2024, 5, 12));
      order.delivery_message = "Logo livré".to_string();
      order.version = 1;
    }
    OrderStatus::Completed => {
      order.delivered_date = Some(date(2024, 5, 1));
      order.delivery_message = "Logo livré".to_string();
      order.version = 2;
    }
    OrderStatus::Cancelled => {
      order.cancellation_reason = Some("Client unreachable".to_string());
      order.version = 1;
    }
  }
  order
}

/// One order per status, in `OrderStatus::ALL` order; only `revision` and `late` are priority.
pub fn seven_orders() -> Vec<Order> {
  let clients = [
    "Marie Dupont",
    "Jean Martin",
    "Sophie Bernard",
    "Lucas Petit",
    "Emma Durand",
    "Hugo Leroy",
  ];
  let mut orders: Vec<Order> = OrderStatus::ALL
    .iter()
    .zip(clients)
    .map(|(status, client)| {
      let priority = matches!(status, OrderStatus::Late | OrderStatus::Revision);
      order_in(*status, client).with_priority(priority)
    })
    .collect();
  // A second active order so the store holds seven, with a priority one among them.
  orders.push(order_in(OrderStatus::Active, "Marie Curie").with_priority(true));
  orders
}

// --- Backends ---

/// Backend whose writes can be switched to fail, to exercise the pessimistic update path.
#[derive(Default)]
pub struct FlakyBackend {
  pub inner: InMemoryBackend,
  pub fail_writes: AtomicBool,
}

impl FlakyBackend {
  pub fn with_orders(orders: Vec<Order>) -> Self {
    Self {
      inner: InMemoryBackend::with_orders(orders),
      fail_writes: AtomicBool::new(false),
    }
  }

  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  fn check(&self) -> OrderResult<()> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(anyhow::anyhow!("connection reset by peer").into());
    }
    Ok(())
  }
}

#[async_trait]
impl OrderBackend for FlakyBackend {
  async fn create(&self, order: &Order) -> OrderResult<Order> {
    self.check()?;
    self.inner.create(order).await
  }

  async fn read(&self, id: OrderId) -> OrderResult<Order> {
    self.inner.read(id).await
  }

  async fn update(&self, id: OrderId, order: &Order, expected_version: u64) -> OrderResult<Order> {
    self.check()?;
    self.inner.update(id, order, expected_version).await
  }

  async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>> {
    self.inner.list(filter).await
  }
}

pub fn assert_backend_error(err: &OrderError) {
  assert!(matches!(err, OrderError::Backend { .. }), "expected Backend error, got {:?}", err);
}

// --- Workflow ---

pub async fn workflow_over(backend: Arc<dyn OrderBackend>) -> (OrderWorkflow, Arc<FixedClock>) {
  let clock = Arc::new(FixedClock::new(now()));
  let workflow = OrderWorkflow::new(backend, WorkflowConfig::default()).with_clock(clock.clone());
  workflow.load().await.expect("load from backend");
  (workflow, clock)
}

pub async fn workflow_with(orders: Vec<Order>) -> (OrderWorkflow, InMemoryBackend, Arc<FixedClock>) {
  let backend = InMemoryBackend::with_orders(orders);
  let (workflow, clock) = workflow_over(Arc::new(backend.clone())).await;
  (workflow, backend, clock)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
