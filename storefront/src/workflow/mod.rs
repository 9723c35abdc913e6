// storefront/src/workflow/mod.rs

//! Step pipelines for the storefront's multi-step operations.
//!
//! A pipeline is an ordered list of named steps. Each step owns one or more async
//! handlers that operate on a shared, lockable context (`ContextData<TData>`) and
//! return a `PipelineControl` telling the runner whether to carry on. Pipelines
//! are registered once at startup in a `Workflows` registry keyed by their context
//! data type, so a handler only has to build the context and call `run`.

mod context_data;
mod control;
mod error;
mod pipeline;
mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use error::{WorkflowError, WorkflowResult};
pub use pipeline::{Handler, Pipeline, StepDef};
pub use registry::Workflows;
