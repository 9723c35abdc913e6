// storefront/src/lib.rs

//! Dairy-X storefront backend: catalog, session cart, checkout and the admin
//! dashboard, served as a JSON API over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod web;
pub mod workflow;

pub use errors::{AppError, Result};
pub use state::AppState;
