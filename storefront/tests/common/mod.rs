// tests/common/mod.rs
#![allow(dead_code)]

use dairyx::config::AppConfig;
use dairyx::models::{NewProduct, NewUser, Principal, Product, ProductStatus, User, UserRole};
use dairyx::services::auth_service;
use dairyx::store::{MemoryStore, Store};
use dairyx::workflow::{ContextData, Handler, PipelineControl, WorkflowError};
use dairyx::AppState;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Config & state ---
pub const ADMIN_EMAIL: &str = "admin@dairy-x.test";
pub const ADMIN_PASSWORD: &str = "admin-secret-1";
pub const CUSTOMER_PASSWORD: &str = "milkshake42";

pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = HashMap::from([
    ("DATABASE_URL", "postgres://unused/test"),
    ("ADMIN_USERNAME", "admin"),
    ("ADMIN_EMAIL", ADMIN_EMAIL),
    ("ADMIN_PASSWORD", ADMIN_PASSWORD),
  ]);
  AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("test config should build")
}

pub fn memory_state() -> (MemoryStore, AppState) {
  let store = MemoryStore::new();
  let state = AppState::new(Arc::new(store.clone()), Arc::new(test_config()));
  (store, state)
}

// --- Fixtures ---
pub struct Catalog {
  pub milk: Product,
  pub paneer: Product,
  pub peda: Product,
  pub retired: Product,
}

pub async fn add_product(store: &dyn Store, category: &str, name: &str, price: Decimal, status: ProductStatus) -> Product {
  let category_id = store.ensure_category(category).await.expect("category");
  store
    .insert_product(NewProduct {
      name: name.to_string(),
      price,
      image: format!("images/{}.jpg", name.to_lowercase().replace(' ', "-")),
      category_id,
      status,
    })
    .await
    .expect("product")
}

pub async fn seed_catalog(store: &dyn Store) -> Catalog {
  Catalog {
    milk: add_product(store, "Milk", "Cow Milk", Decimal::new(6000, 2), ProductStatus::Active).await,
    paneer: add_product(store, "Milk", "Paneer", Decimal::new(8000, 2), ProductStatus::Active).await,
    peda: add_product(store, "Sweet", "Peda", Decimal::new(40000, 2), ProductStatus::Active).await,
    retired: add_product(store, "Cream", "Old Cream", Decimal::new(9900, 2), ProductStatus::Inactive).await,
  }
}

pub async fn create_user(store: &dyn Store, email: &str, password: &str, role: UserRole) -> User {
  store
    .insert_user(NewUser {
      fullname: "Test Person".to_string(),
      email: email.to_string(),
      phone: Some("9876543210".to_string()),
      password_hash: auth_service::hash_password(password).expect("hash"),
      role,
    })
    .await
    .expect("user")
}

pub async fn create_admin(store: &dyn Store) -> User {
  create_user(store, ADMIN_EMAIL, ADMIN_PASSWORD, UserRole::Admin).await
}

/// Creates the account and a live session for it; returns the bearer token.
pub async fn signed_in(store: &dyn Store, email: &str, role: UserRole) -> (User, String) {
  let password = match role {
    UserRole::Admin => ADMIN_PASSWORD,
    UserRole::User => CUSTOMER_PASSWORD,
  };
  let user = create_user(store, email, password, role).await;
  let principal = Principal {
    user_id: user.id,
    role: user.role,
  };
  let token = auth_service::issue_session(store, principal, 24).await.expect("session");
  (user, token)
}

// --- HTTP helpers ---
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
  (actix_web::http::header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn shipping_payload(items: serde_json::Value, payment_method: &str) -> serde_json::Value {
  serde_json::json!({
    "fullname": "Asha Patil",
    "phone": "9876543210",
    "email": "asha@example.com",
    "address": "12 Dairy Lane",
    "city": "Pune",
    "state": "Maharashtra",
    "pincode": "411001",
    "landmark": "Near the temple",
    "payment_method": payment_method,
    "items": items,
  })
}

// --- Workflow fixtures ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("Workflow error: {0}")]
  Workflow(#[from] WorkflowError),
  #[error("Handler failed: {0}")]
  Handler(String),
}

pub fn record_step(step_name: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      Ok(PipelineControl::Continue)
    })
  })
}
