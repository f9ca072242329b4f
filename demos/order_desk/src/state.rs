// demos/order_desk/src/state.rs
use crate::config::AppConfig;
use gigflow::OrderWorkflow;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub workflow: Arc<OrderWorkflow>,
  pub config: Arc<AppConfig>, // Share loaded config
}
