// demos/order_desk/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::web::extractors::ActingUser;
use gigflow::{available_actions, AttachmentRef, Order, OrderAction, OrderId, OrderQuery, OrderSort, OrderTab};

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct ListOrdersQuery {
  pub tab: Option<String>,
  pub search: Option<String>,
  pub sort: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub client: String,
  pub service: String,
  pub due_date: NaiveDate,
  pub total_cents: u64,
  #[serde(default)]
  pub priority: bool,
  pub note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DeliverPayload {
  pub message: String,
  #[serde(default)]
  pub attachments: Vec<AttachmentRef>,
}

#[derive(Deserialize, Debug)]
pub struct RevisionPayload {
  pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct CancelPayload {
  pub reason: String,
}

// --- Response DTOs ---

#[derive(Serialize, Debug)]
pub struct TabCount {
  pub tab: OrderTab,
  pub label: &'static str,
  pub count: usize,
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
  OrderId::from_str(raw).map_err(|_| AppError::Validation(format!("'{}' is not a valid order id", raw)))
}

fn build_query(params: &ListOrdersQuery) -> Result<OrderQuery> {
  let tab = match params.tab.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    Some(raw) => OrderTab::from_str(raw).map_err(|e| AppError::Validation(e.to_string()))?,
    None => OrderTab::Active,
  };
  let mut query = OrderQuery::tab(tab).with_search(params.search.clone().unwrap_or_default());
  // Without `sort` the workflow applies its configured default.
  if let Some(raw) = params.sort.as_deref() {
    query = query.with_sort(OrderSort::from_str(raw).map_err(|e| AppError::Validation(e.to_string()))?);
  }
  Ok(query)
}

fn order_response(message: &str, order: &Order, acting: &ActingUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "message": message,
      "order": order,
      "availableActions": available_actions(order.status, acting.actor),
  }))
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_orders", skip(app_state, params), fields(tab = ?params.tab))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse> {
  let query = build_query(&params)?;
  let orders = app_state.workflow.view(&query);
  info!(tab = %query.tab, shown = orders.len(), "Orders listed.");
  Ok(HttpResponse::Ok().json(json!({
      "tab": query.tab,
      "label": query.tab.label(),
      "orders": orders,
  })))
}

#[instrument(name = "handler::order_counts", skip(app_state))]
pub async fn order_counts_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let counts: Vec<TabCount> = app_state
    .workflow
    .tab_counts()
    .into_iter()
    .map(|(tab, count)| TabCount {
      tab,
      label: tab.label(),
      count,
    })
    .collect();
  Ok(HttpResponse::Ok().json(counts))
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, payload, acting),
  fields(actor = %acting.actor, client = %payload.client)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderPayload>,
  acting: ActingUser,
) -> Result<HttpResponse> {
  let payload = payload.into_inner();
  let mut order = Order::new(payload.client, payload.service, payload.due_date, payload.total_cents)
    .with_priority(payload.priority);
  order.note = payload.note.filter(|note| !note.trim().is_empty());

  let created = app_state.workflow.create(order, acting.actor).await?;
  info!(order_id = %created.id, "Order created via API.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Order created.",
      "order": created,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let order = app_state.workflow.get(id)?;
  let status = app_state
    .workflow
    .classifier()
    .effective_status(&order, app_state.workflow.today());
  Ok(HttpResponse::Ok().json(json!({
      "order": order,
      "effectiveStatus": status,
  })))
}

#[instrument(name = "handler::order_history", skip(app_state))]
pub async fn order_history_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let events = app_state.workflow.history(id)?;
  Ok(HttpResponse::Ok().json(events))
}

#[instrument(
  name = "handler::deliver_order",
  skip(app_state, payload, acting),
  fields(actor = %acting.actor, attachments = payload.attachments.len())
)]
pub async fn deliver_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<DeliverPayload>,
  acting: ActingUser,
) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let payload = payload.into_inner();
  let action = OrderAction::Deliver {
    message: payload.message,
    attachments: payload.attachments,
  };
  let order = app_state.workflow.apply(id, action, acting.actor).await?;
  Ok(order_response("Delivery sent.", &order, &acting))
}

#[instrument(name = "handler::request_revision", skip(app_state, payload, acting), fields(actor = %acting.actor))]
pub async fn request_revision_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<RevisionPayload>,
  acting: ActingUser,
) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let action = OrderAction::request_revision(payload.into_inner().message);
  let order = app_state.workflow.apply(id, action, acting.actor).await?;
  Ok(order_response("Revision requested.", &order, &acting))
}

#[instrument(name = "handler::complete_order", skip(app_state, acting), fields(actor = %acting.actor))]
pub async fn complete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  acting: ActingUser,
) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let order = app_state.workflow.mark_completed(id, acting.actor).await?;
  Ok(order_response("Order completed.", &order, &acting))
}

#[instrument(name = "handler::cancel_order", skip(app_state, payload, acting), fields(actor = %acting.actor))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<CancelPayload>,
  acting: ActingUser,
) -> Result<HttpResponse> {
  let id = parse_order_id(&path)?;
  let order = app_state
    .workflow
    .cancel(id, acting.actor, payload.into_inner().reason)
    .await?;
  Ok(order_response("Order cancelled.", &order, &acting))
}
