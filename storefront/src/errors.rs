// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::workflow::WorkflowError;

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<sqlx::Error> for AppError {
  /// Unique violations and serialization failures are caller-visible conflicts;
  /// everything else stays a 500.
  fn from(err: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db_err) = &err {
      match db_err.code().as_deref() {
        Some(SQLSTATE_UNIQUE_VIOLATION) => {
          return AppError::Conflict(format!(
            "Duplicate value violates {}",
            db_err.constraint().unwrap_or("a unique constraint")
          ));
        }
        Some(SQLSTATE_SERIALIZATION_FAILURE) => {
          return AppError::Conflict("Concurrent update detected, please retry.".to_string());
        }
        _ => {}
      }
    }
    AppError::Sqlx(err)
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let message = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m) => {
        tracing::warn!(application_error = %self, "Responding with client error");
        m.clone()
      }
      AppError::Workflow { source } => {
        tracing::error!(workflow_error_source = ?source, "Workflow error details");
        "An internal error occurred".to_string()
      }
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => {
        tracing::error!(application_error = %self, "Responding with error");
        "An internal error occurred".to_string()
      }
    };
    HttpResponse::build(status).json(json!({ "success": false, "message": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_errors_keep_their_message() {
    let resp = AppError::NotFound("Order not found".into()).error_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
  }

  #[test]
  fn server_errors_map_to_500() {
    let err = AppError::from(WorkflowError::HandlerMissing {
      step_name: "x".into(),
    });
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
      AppError::from(sqlx::Error::RowNotFound).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
