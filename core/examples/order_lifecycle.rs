// gigflow/examples/order_lifecycle.rs

use gigflow::{Actor, InMemoryBackend, Order, OrderError, OrderWorkflow, WorkflowConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), OrderError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Order Lifecycle Example ---");

  // 1. A workflow over an in-memory backend
  let mut workflow = OrderWorkflow::new(Arc::new(InMemoryBackend::new()), WorkflowConfig::default());
  workflow.on_transition(|event| {
    info!(
      "[hook] #{} {} by {}: {:?} -> {}",
      event.seq, event.kind, event.actor, event.from, event.to
    );
  });

  // 2. An order arrives from checkout
  let due = workflow.today() + chrono::Duration::days(7);
  let order = workflow
    .create(Order::new("Marie Dupont", "Logo design", due, 15_000), Actor::Client)
    .await?;
  let id = order.id;

  // 3. An empty delivery is refused and nothing changes
  if let Err(e) = workflow.deliver(id, "   ", Vec::new()).await {
    warn!("Delivery refused as expected: {}", e);
  }

  // 4. Deliver, ask for changes, re-deliver, complete
  workflow.deliver(id, "Logo livré", Vec::new()).await?;
  workflow.request_revision(id, "Pouvez-vous essayer en bleu ?").await?;
  let redelivered = workflow.deliver(id, "Corrections appliquées", Vec::new()).await?;
  info!("Revision count after re-delivery: {}", redelivered.revision_count);
  let completed = workflow.mark_completed(id, Actor::Client).await?;

  // 5. Completed is terminal
  if let Err(e) = workflow.deliver(id, "Une dernière version", Vec::new()).await {
    warn!("Delivery after completion refused: {}", e);
  }

  let history = workflow.history(id)?;
  info!(
    "Final status: {} after {} events (version {}).",
    completed.status,
    history.len(),
    completed.version
  );
  Ok(())
}
