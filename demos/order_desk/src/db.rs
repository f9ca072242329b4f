// demos/order_desk/src/db.rs

//! `OrderBackend` over Postgres, using runtime (unchecked) queries so the
//! service builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gigflow::{AttachmentRef, Order, OrderBackend, OrderError, OrderFilter, OrderId, OrderResult, OrderStatus};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use std::str::FromStr;
use tracing::{event, instrument, Level};
use uuid::Uuid;

pub const SCHEMA: &str = include_str!("../migrations/schema.sql");

const ORDER_COLUMNS: &str = "id, client, service, due_date, delivered_date, total_cents, status, priority, note, \
   delivery_message, revision_message, cancellation_reason, revision_count, attachments, version, updated_at";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgOrderBackend {
  pool: PgPool,
}

impl PgOrderBackend {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Creates the `orders` table if it does not exist yet.
  pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
    Ok(())
  }
}

fn backend_error(err: sqlx::Error) -> OrderError {
  OrderError::from(anyhow::Error::new(err))
}

fn to_db_int(field: &'static str, value: u64) -> OrderResult<i64> {
  i64::try_from(value).map_err(|_| OrderError::Invalid {
    field,
    message: format!("{} does not fit in a BIGINT column", value),
  })
}

fn to_db_count(field: &'static str, value: u32) -> OrderResult<i32> {
  i32::try_from(value).map_err(|_| OrderError::Invalid {
    field,
    message: format!("{} does not fit in an INT column", value),
  })
}

fn from_db_int<T: TryFrom<i64>>(field: &str, value: i64) -> OrderResult<T> {
  T::try_from(value).map_err(|_| OrderError::Internal(format!("column {} holds out-of-range value {}", field, value)))
}

fn order_from_row(row: &PgRow) -> OrderResult<Order> {
  let status: String = row.try_get("status").map_err(backend_error)?;
  let status = OrderStatus::from_str(&status).map_err(|e| OrderError::Internal(e.to_string()))?;
  let total_cents: i64 = row.try_get("total_cents").map_err(backend_error)?;
  let revision_count: i32 = row.try_get("revision_count").map_err(backend_error)?;
  let version: i64 = row.try_get("version").map_err(backend_error)?;
  let attachments: Json<Vec<AttachmentRef>> = row.try_get("attachments").map_err(backend_error)?;
  let id: Uuid = row.try_get("id").map_err(backend_error)?;

  Ok(Order {
    id: OrderId(id),
    client: row.try_get("client").map_err(backend_error)?,
    service: row.try_get("service").map_err(backend_error)?,
    due_date: row.try_get::<NaiveDate, _>("due_date").map_err(backend_error)?,
    delivered_date: row.try_get::<Option<NaiveDate>, _>("delivered_date").map_err(backend_error)?,
    total_cents: from_db_int("total_cents", total_cents)?,
    status,
    priority: row.try_get("priority").map_err(backend_error)?,
    note: row.try_get("note").map_err(backend_error)?,
    delivery_message: row.try_get("delivery_message").map_err(backend_error)?,
    revision_message: row.try_get("revision_message").map_err(backend_error)?,
    cancellation_reason: row.try_get("cancellation_reason").map_err(backend_error)?,
    revision_count: from_db_int::<u32>("revision_count", i64::from(revision_count))?,
    attachments: attachments.0,
    version: from_db_int("version", version)?,
    updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(backend_error)?,
  })
}

#[async_trait]
impl OrderBackend for PgOrderBackend {
  #[instrument(name = "PgOrderBackend::create", skip_all, fields(order_id = %order.id), err(Display))]
  async fn create(&self, order: &Order) -> OrderResult<Order> {
    let sql = format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING {}",
      ORDER_COLUMNS, ORDER_COLUMNS
    );
    let result = sqlx::query(&sql)
      .bind(order.id.0)
      .bind(&order.client)
      .bind(&order.service)
      .bind(order.due_date)
      .bind(order.delivered_date)
      .bind(to_db_int("total_cents", order.total_cents)?)
      .bind(order.status.as_str())
      .bind(order.priority)
      .bind(&order.note)
      .bind(&order.delivery_message)
      .bind(&order.revision_message)
      .bind(&order.cancellation_reason)
      .bind(to_db_count("revision_count", order.revision_count)?)
      .bind(Json(&order.attachments))
      .bind(to_db_int("version", order.version)?)
      .bind(order.updated_at)
      .fetch_one(&self.pool)
      .await;

    match result {
      Ok(row) => order_from_row(&row),
      Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
        Err(OrderError::Duplicate { id: order.id })
      }
      Err(e) => Err(backend_error(e)),
    }
  }

  #[instrument(name = "PgOrderBackend::read", skip(self), err(Display))]
  async fn read(&self, id: OrderId) -> OrderResult<Order> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let row = sqlx::query(&sql)
      .bind(id.0)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    match row {
      Some(row) => order_from_row(&row),
      None => Err(OrderError::NotFound { id }),
    }
  }

  #[instrument(name = "PgOrderBackend::update", skip(self, order), fields(order_id = %id), err(Display))]
  async fn update(&self, id: OrderId, order: &Order, expected_version: u64) -> OrderResult<Order> {
    let sql = format!(
      "UPDATE orders SET client = $2, service = $3, due_date = $4, delivered_date = $5, total_cents = $6, \
       status = $7, priority = $8, note = $9, delivery_message = $10, revision_message = $11, \
       cancellation_reason = $12, revision_count = $13, attachments = $14, version = $15, updated_at = $16 \
       WHERE id = $1 AND version = $17 RETURNING {}",
      ORDER_COLUMNS
    );
    let row = sqlx::query(&sql)
      .bind(id.0)
      .bind(&order.client)
      .bind(&order.service)
      .bind(order.due_date)
      .bind(order.delivered_date)
      .bind(to_db_int("total_cents", order.total_cents)?)
      .bind(order.status.as_str())
      .bind(order.priority)
      .bind(&order.note)
      .bind(&order.delivery_message)
      .bind(&order.revision_message)
      .bind(&order.cancellation_reason)
      .bind(to_db_count("revision_count", order.revision_count)?)
      .bind(Json(&order.attachments))
      .bind(to_db_int("version", order.version)?)
      .bind(order.updated_at)
      .bind(to_db_int("version", expected_version)?)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;

    if let Some(row) = row {
      return order_from_row(&row);
    }

    // Nothing matched: either the order is gone or someone else moved its version.
    let found: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
      .bind(id.0)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    match found {
      None => Err(OrderError::NotFound { id }),
      Some(found) => {
        event!(Level::WARN, expected_version, found, "Optimistic version check failed.");
        Err(OrderError::Conflict {
          id,
          expected: expected_version,
          found: from_db_int("version", found)?,
        })
      }
    }
  }

  #[instrument(name = "PgOrderBackend::list", skip(self), err(Display))]
  async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders \
       WHERE ($1::text IS NULL OR status = $1) \
         AND ($2::text IS NULL OR client ILIKE '%' || $2 || '%') \
       ORDER BY created_seq",
      ORDER_COLUMNS
    );
    let client = filter
      .client
      .as_deref()
      .map(str::trim)
      .filter(|needle| !needle.is_empty());
    let rows = sqlx::query(&sql)
      .bind(filter.status.map(|status| status.as_str()))
      .bind(client)
      .fetch_all(&self.pool)
      .await
      .map_err(backend_error)?;
    rows.iter().map(order_from_row).collect()
  }
}
