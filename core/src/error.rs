// gigflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::action::{ActionKind, Actor};
use crate::core::order::OrderId;
use crate::core::status::OrderStatus;

/// Rejection produced by the pure state machine. The order it was asked to
/// change is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
  #[error("{action} requires a non-empty message")]
  EmptyMessage { action: ActionKind },

  #[error("cannot {action} an order in status '{from}'")]
  NotAllowed { from: OrderStatus, action: ActionKind },

  #[error("{actor} is not allowed to {action}")]
  Forbidden { actor: Actor, action: ActionKind },
}

#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Transition rejected: {0}")]
  Transition(#[from] TransitionError),

  #[error("Invalid {field}: {message}")]
  Invalid { field: &'static str, message: String },

  #[error("Attachment '{name}' rejected: {message}")]
  Attachment { name: String, message: String },

  #[error("Order not found: {id}")]
  NotFound { id: OrderId },

  #[error("Order already exists: {id}")]
  Duplicate { id: OrderId },

  #[error("Order {id} was modified concurrently (expected version {expected}, found {found})")]
  Conflict { id: OrderId, expected: u64, found: u64 },

  #[error("Persistence backend failed. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal gigflow error: {0}")]
  Internal(String),
}

impl OrderError {
  /// Recoverable input problems: the caller should correct the request and retry.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      OrderError::Transition(TransitionError::EmptyMessage { .. })
        | OrderError::Invalid { .. }
        | OrderError::Attachment { .. }
    )
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, OrderError::NotFound { .. })
  }
}

impl From<AnyhowError> for OrderError {
  fn from(err: AnyhowError) -> Self {
    // Don't bury an OrderError that already travelled through anyhow.
    match err.downcast::<OrderError>() {
      Ok(order_err) => order_err,
      Err(err) => OrderError::Backend { source: err },
    }
  }
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
