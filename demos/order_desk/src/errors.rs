// demos/order_desk/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use gigflow::{OrderError, TransitionError};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Order Workflow Error: {source}")]
  Order {
    #[from] // Allows conversion from gigflow::OrderError
    source: OrderError,
  },
}

fn order_error_status(err: &OrderError) -> StatusCode {
  match err {
    OrderError::Transition(TransitionError::EmptyMessage { .. })
    | OrderError::Invalid { .. }
    | OrderError::Attachment { .. } => StatusCode::BAD_REQUEST,
    OrderError::Transition(TransitionError::Forbidden { .. }) => StatusCode::FORBIDDEN,
    OrderError::Transition(TransitionError::NotAllowed { .. })
    | OrderError::Duplicate { .. }
    | OrderError::Conflict { .. } => StatusCode::CONFLICT,
    OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
    OrderError::Backend { .. } | OrderError::Config(_) | OrderError::Internal(_) => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Order { source } => order_error_status(source),
      AppError::Config(_) | AppError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Log the full error when it's turned into a response
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with client error");
    }
    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) => json!({ "error": m }),
      AppError::Order { source } if !status.is_server_error() => json!({ "error": source.to_string() }),
      AppError::Order { .. } => json!({ "error": "Order processing failed" }),
      AppError::Sqlx(_) => json!({ "error": "Database operation failed" }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
