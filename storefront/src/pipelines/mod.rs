// storefront/src/pipelines/mod.rs

//! Defines and registers the multi-step workflows of the storefront.

use crate::errors::AppError;
use crate::workflow::Workflows;

pub mod contexts;
pub mod order_input;

pub mod cart_pipeline;
pub mod place_order_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline with `workflows`. Called once while building `AppState`.
pub fn register_all_pipelines(workflows: &Workflows<AppError>) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(workflows);
  signin_pipeline::register_signin_pipeline(workflows);
  cart_pipeline::register_add_to_cart_pipeline(workflows);
  place_order_pipeline::register_place_order_pipeline(workflows);

  tracing::info!("All application pipelines registered.");
}
