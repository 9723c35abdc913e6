// storefront/src/services/mod.rs

pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_queries;
pub mod pricing;
