// demos/order_desk/src/seed.rs

//! A handful of demo orders covering every tab, written through the
//! workflow so the event log and backend stay in step.

use chrono::{Duration, NaiveDate};
use gigflow::{Actor, Order, OrderResult, OrderWorkflow};
use tracing::{info, instrument};

fn due_in(today: NaiveDate, days: i64) -> NaiveDate {
  today + Duration::days(days)
}

#[instrument(name = "seed_demo_orders", skip_all, err(Display))]
pub async fn seed_demo_orders(workflow: &OrderWorkflow) -> OrderResult<usize> {
  if !workflow.store().is_empty() {
    info!(existing = workflow.store().len(), "Store already holds orders, skipping demo seed.");
    return Ok(0);
  }
  let today = workflow.today();

  let logo = workflow
    .create(
      Order::new("Marie Dupont", "Logo design", due_in(today, 10), 25_000).with_priority(true),
      Actor::Client,
    )
    .await?;
  workflow
    .create(
      Order::new("Jean Martin", "Landing page copy", due_in(today, -2), 18_000),
      Actor::Client,
    )
    .await?;

  let brochure = workflow
    .create(
      Order::new("Sophie Bernard", "Brochure layout", due_in(today, 5), 40_000),
      Actor::Client,
    )
    .await?;
  workflow.deliver(brochure.id, "Première version du dépliant.", Vec::new()).await?;
  workflow
    .request_revision(brochure.id, "Merci d'agrandir le logo en couverture.")
    .await?;

  let banner = workflow
    .create(
      Order::new("Lucas Petit", "Social media banner", due_in(today, 3), 9_000).with_note("Format 1500x500"),
      Actor::Client,
    )
    .await?;
  workflow.deliver(banner.id, "Bannière livrée en PNG.", Vec::new()).await?;

  let cards = workflow
    .create(
      Order::new("Marie Dupont", "Business cards", due_in(today, 1), 12_000),
      Actor::Client,
    )
    .await?;
  workflow.deliver(cards.id, "Fichiers prêts pour l'imprimeur.", Vec::new()).await?;
  workflow.mark_completed(cards.id, Actor::Client).await?;

  let video = workflow
    .create(
      Order::new("Camille Leroy", "Video editing", due_in(today, 20), 60_000),
      Actor::Client,
    )
    .await?;
  workflow.cancel(video.id, Actor::Client, "Projet reporté").await?;

  info!(priority_order = %logo.id, seeded = workflow.store().len(), "Demo orders seeded.");
  Ok(workflow.store().len())
}
