// storefront/src/workflow/error.rs

use thiserror::Error;

/// Failures raised by the runner itself rather than by step handlers.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },
}

pub type WorkflowResult<T, E = WorkflowError> = std::result::Result<T, E>;
