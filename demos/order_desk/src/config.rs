// demos/order_desk/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use gigflow::{AttachmentPolicy, OrderSort, WorkflowConfig};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Postgres backend when set, in-memory backend otherwise.
  pub database_url: Option<String>,
  pub workflow: WorkflowConfig,
  pub seed_demo_orders: bool,
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  let raw = env::var(name).unwrap_or_else(|_| default.to_string());
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}

fn megabytes_to_bytes(megabytes: u64) -> Result<u64> {
  megabytes.checked_mul(1024 * 1024).ok_or_else(|| {
    AppError::Config(format!(
      "Invalid ORDER_MAX_ATTACHMENT_MB value '{}': too large",
      megabytes
    ))
  })
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var::<u16>("SERVER_PORT", "8080")?;
    let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

    let max_attachment_mb = parse_var::<u64>("ORDER_MAX_ATTACHMENT_MB", "50")?;
    let workflow = WorkflowConfig {
      attachment_policy: AttachmentPolicy::default().with_max_bytes(megabytes_to_bytes(max_attachment_mb)?),
      derive_late: parse_var::<bool>("ORDER_DERIVE_LATE", "true")?,
      default_sort: parse_var::<OrderSort>("ORDER_DEFAULT_SORT", "insertion")?,
    };
    workflow
      .validate()
      .map_err(|e| AppError::Config(e.to_string()))?;

    let seed_demo_orders = parse_var::<bool>("SEED_DEMO_ORDERS", "false")?;

    tracing::info!(
      backend = if database_url.is_some() { "postgres" } else { "memory" },
      "Application configuration loaded successfully."
    );
    // The database URL may carry credentials; it is never logged.

    Ok(Self {
      server_host,
      server_port,
      database_url,
      workflow,
      seed_demo_orders,
    })
  }
}
