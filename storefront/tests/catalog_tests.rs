// tests/catalog_tests.rs
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::*;
use dairyx::config::AppConfig;
use dairyx::models::{ProductStatus, UserRole};
use dairyx::store::seed::seed_store;
use dairyx::store::{MemoryStore, Store};
use dairyx::web::configure_app_routes;
use rust_decimal::Decimal;
use serde_json::Value;
use serial_test::serial;
use uuid::Uuid;

#[actix_rt::test]
#[serial]
async fn listing_filters_by_category_and_hides_inactive() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let req = test::TestRequest::get().uri("/api/products").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let names: Vec<&str> = body["products"]
    .as_array()
    .expect("products")
    .iter()
    .filter_map(|p| p["name"].as_str())
    .collect();
  // Newest first; the inactive product is never listed.
  assert_eq!(names, vec!["Peda", "Paneer", "Cow Milk"]);

  let req = test::TestRequest::get().uri("/api/products?category=milk").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["products"].as_array().map(Vec::len), Some(2));

  let req = test::TestRequest::get()
    .uri(&format!("/api/products/{}", catalog.peda.id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["product"]["category"], "Sweet");
  assert_eq!(body["product"]["price"], 400.0);

  let req = test::TestRequest::get()
    .uri(&format!("/api/products/{}", Uuid::new_v4()))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get().uri("/api/products/not-a-uuid").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
#[serial]
async fn categories_and_health_are_public() {
  setup_tracing();
  let (store, state) = memory_state();
  seed_catalog(&store).await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let req = test::TestRequest::get().uri("/api/categories").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["categories"].as_array().map(Vec::len), Some(3));

  let req = test::TestRequest::get().uri("/api/health").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["status"], "ok");
  assert_eq!(body["backend"], "memory");
}

#[tokio::test]
#[serial]
async fn seeding_is_idempotent() {
  setup_tracing();
  let store = MemoryStore::new();
  let config = test_config();

  seed_store(&store, &config).await.expect("first seed");
  let products = store.list_products(None).await.expect("products").len();
  assert!(products > 0);

  seed_store(&store, &config).await.expect("second seed");
  assert_eq!(store.list_products(None).await.expect("products").len(), products);

  let admin = store
    .find_user_by_email(ADMIN_EMAIL, UserRole::Admin)
    .await
    .expect("lookup")
    .expect("admin seeded");
  assert_eq!(admin.role, UserRole::Admin);
}

#[tokio::test]
#[serial]
async fn seeding_without_admin_password_skips_the_admin() {
  setup_tracing();
  let store = MemoryStore::new();
  let config = AppConfig::from_lookup(|name| match name {
    "DATABASE_URL" => Some("postgres://unused/test".to_string()),
    _ => None,
  })
  .expect("config");

  seed_store(&store, &config).await.expect("seed");
  assert!(!store.email_exists(&config.admin_email).await.expect("lookup"));
}

#[tokio::test]
#[serial]
async fn seeding_leaves_an_all_inactive_catalog_alone() {
  setup_tracing();
  let store = MemoryStore::new();
  add_product(&store, "Milk", "Discontinued Lassi", Decimal::new(3000, 2), ProductStatus::Inactive).await;

  seed_store(&store, &test_config()).await.expect("seed");
  assert_eq!(store.count_products().await.expect("count"), 1);
  assert!(store.list_products(None).await.expect("products").is_empty());
}

#[tokio::test]
#[serial]
async fn seeding_does_not_adopt_a_customer_holding_the_admin_email() {
  setup_tracing();
  let store = MemoryStore::new();
  let customer = create_user(&store, ADMIN_EMAIL, CUSTOMER_PASSWORD, UserRole::User).await;

  seed_store(&store, &test_config()).await.expect("seed");
  assert!(store
    .find_user_by_email(ADMIN_EMAIL, UserRole::Admin)
    .await
    .expect("lookup")
    .is_none());
  let still_customer = store
    .find_user_by_email(ADMIN_EMAIL, UserRole::User)
    .await
    .expect("lookup")
    .expect("customer kept");
  assert_eq!(still_customer.id, customer.id);
}
