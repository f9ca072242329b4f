// gigflow/examples/dashboard_tabs.rs

use gigflow::{Actor, InMemoryBackend, Order, OrderError, OrderQuery, OrderSort, OrderTab, OrderWorkflow, WorkflowConfig};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), OrderError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Dashboard Tabs Example ---");

  let workflow = OrderWorkflow::new(Arc::new(InMemoryBackend::new()), WorkflowConfig::default());
  let today = workflow.today();

  let mut ids = Vec::new();
  for (client, service, days, priority) in [
    ("Marie Dupont", "Logo", 10, true),
    ("Jean Martin", "Flyer", 3, false),
    ("Sophie Bernard", "Site vitrine", 20, true),
    ("Lucas Petit", "Carte de visite", 5, false),
  ] {
    let order = Order::new(client, service, today + chrono::Duration::days(days), 20_000).with_priority(priority);
    ids.push(workflow.create(order, Actor::Client).await?.id);
  }

  workflow.deliver(ids[1], "Flyer A5 recto-verso", Vec::new()).await?;
  workflow.deliver(ids[2], "Maquette v1", Vec::new()).await?;
  workflow.request_revision(ids[2], "Ajouter une page tarifs").await?;
  workflow.cancel(ids[3], Actor::Client, "Projet annulé").await?;

  for (tab, count) in workflow.tab_counts() {
    info!("{:>10} ({}) : {}", tab.label(), tab, count);
  }

  // Tabs can be addressed by their dashboard label.
  let tab = OrderTab::from_str("priorité").unwrap_or(OrderTab::Priority);
  let query = OrderQuery::tab(tab).with_sort(OrderSort::RecentFirst);
  for order in workflow.view(&query) {
    info!("[{}] {} - {} ({})", tab.label(), order.client, order.service, order.status);
  }

  let searched = workflow.view(&OrderQuery::tab(OrderTab::Active).with_search("marie"));
  info!("Active orders for 'marie': {}", searched.len());
  Ok(())
}
