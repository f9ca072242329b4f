// demos/order_desk/src/main.rs

mod config;
mod db;
mod errors;
mod seed;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::PgOrderBackend;
use crate::errors::AppError;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use gigflow::{InMemoryBackend, OrderBackend, OrderWorkflow};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

async fn build_backend(app_config: &AppConfig) -> Result<Arc<dyn OrderBackend>, AppError> {
  let Some(database_url) = app_config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL not set, orders are kept in memory only.");
    return Ok(Arc::new(InMemoryBackend::new()));
  };

  let pool = PgPool::connect(database_url).await?;
  tracing::info!("Successfully connected to the database.");
  let backend = PgOrderBackend::new(pool);
  backend.ensure_schema().await?;
  Ok(Arc::new(backend))
}

async fn build_workflow(app_config: &AppConfig) -> Result<OrderWorkflow, AppError> {
  let backend = build_backend(app_config).await?;
  let mut workflow = OrderWorkflow::new(backend, app_config.workflow.clone());
  workflow.on_transition(|recorded| {
    tracing::info!(
      target: "order_desk::notifications",
      seq = recorded.seq,
      order_id = %recorded.order_id,
      actor = %recorded.actor,
      to = %recorded.to,
      "Order event recorded."
    );
  });

  let loaded = workflow.load().await?;
  tracing::info!(loaded, "Order store loaded from backend.");

  if app_config.seed_demo_orders {
    seed::seed_demo_orders(&workflow).await?;
  }
  Ok(workflow)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting order desk server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let workflow = match build_workflow(&app_config).await {
    Ok(workflow) => Arc::new(workflow),
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the order workflow.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let app_state = AppState {
    workflow,
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
