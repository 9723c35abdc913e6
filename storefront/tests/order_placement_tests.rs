// tests/order_placement_tests.rs
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::*;
use dairyx::models::{OrderStatus, PaymentMethod, PaymentStatus, UserRole};
use dairyx::pipelines::contexts::PlaceOrderCtxData;
use dairyx::pipelines::order_input::PlaceOrderPayload;
use dairyx::services::order_queries;
use dairyx::store::Store;
use dairyx::web::configure_app_routes;
use dairyx::workflow::{ContextData, PipelineResult};
use dairyx::AppError;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

fn payload(items: Value, payment_method: &str) -> PlaceOrderPayload {
  serde_json::from_value(shipping_payload(items, payment_method)).expect("payload should deserialize")
}

#[actix_rt::test]
#[serial]
async fn place_order_prices_and_empties_cart() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let (user, token) = signed_in(&store, "buyer@example.com", UserRole::User).await;
  store.add_cart_quantity(user.id, catalog.milk.id, 2).await.expect("add");
  store.add_cart_quantity(user.id, catalog.peda.id, 1).await.expect("add");
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let items = json!([
    { "product_id": catalog.milk.id, "quantity": 2, "price": 100 },
    { "name": "Peda", "quantity": 1, "price": 50 },
  ]);
  let req = test::TestRequest::post()
    .uri("/api/orders/place")
    .insert_header(bearer(&token))
    .set_json(shipping_payload(items, "cod"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], true);
  assert_eq!(body["total_amount"], 312.5);
  let order_id: Uuid = serde_json::from_value(body["order_id"].clone()).expect("order id");

  assert!(store.cart_lines(user.id).await.expect("cart").is_empty());

  let order = order_queries::order_details(&store, user.id, order_id).await.expect("order");
  assert_eq!(order.order.total_amount, Decimal::new(31250, 2));
  assert_eq!(order.order.tax_amount, Decimal::new(1250, 2));
  assert_eq!(order.order.delivery_fee, Decimal::new(5000, 2));
  assert_eq!(order.order.status, OrderStatus::Pending);
  assert_eq!(order.order.payment_method, PaymentMethod::Cod);
  assert_eq!(order.order.payment_status, PaymentStatus::Pending);
  assert_eq!(order.items.len(), 2);
  let peda_line = order.items.iter().find(|i| i.product_id == catalog.peda.id).expect("peda line");
  assert_eq!(peda_line.price, Decimal::new(50, 0));
  assert_eq!(peda_line.quantity, 1);
}

#[actix_rt::test]
#[serial]
async fn order_listing_and_details_are_owner_scoped() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let (_owner, owner_token) = signed_in(&store, "owner@example.com", UserRole::User).await;
  let (_other, other_token) = signed_in(&store, "other@example.com", UserRole::User).await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let items = json!([{ "product_id": catalog.paneer.id, "quantity": 1, "price": 80 }]);
  let req = test::TestRequest::post()
    .uri("/api/orders/place")
    .insert_header(bearer(&owner_token))
    .set_json(shipping_payload(items, "cod"))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let order_id = body["order_id"].as_str().expect("order id").to_string();

  let req = test::TestRequest::get().uri("/api/orders/get").insert_header(bearer(&owner_token)).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let orders = body["orders"].as_array().expect("orders");
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0]["id"], order_id.as_str());
  assert_eq!(orders[0]["items"][0]["name"], "Paneer");

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/details?order_id={}", order_id))
    .insert_header(bearer(&other_token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/details?order_id={}", order_id))
    .insert_header(bearer(&owner_token))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], "pending");
}

#[tokio::test]
#[serial]
async fn unresolvable_item_rolls_back_everything() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let user = create_user(&store, "rollback@example.com", CUSTOMER_PASSWORD, UserRole::User).await;
  store.add_cart_quantity(user.id, catalog.milk.id, 2).await.expect("add");

  let items = json!([
    { "product_id": catalog.milk.id, "quantity": 2, "price": 60 },
    { "name": "Peda", "quantity": 1, "price": 400 },
    { "name": "Unicorn Ghee", "quantity": 1, "price": 10 },
  ]);
  let ctx = ContextData::new(PlaceOrderCtxData::new(state.clone(), user.id, payload(items, "cod")));
  let err = state.workflows.run(ctx.clone()).await.expect_err("item 3 cannot be resolved");

  assert!(matches!(err, AppError::NotFound(ref m) if m == "Product not found for item 3: Unicorn Ghee"));
  assert!(!ctx.read().committed);
  assert!(!ctx.read().tx.is_open());
  assert_eq!(store.order_count().await, 0);
  assert_eq!(store.order_item_count().await, 0);
  let cart = store.cart_lines(user.id).await.expect("cart");
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].quantity, 2);
}

#[tokio::test]
#[serial]
async fn failed_item_insert_rolls_back_everything() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let user = create_user(&store, "flaky@example.com", CUSTOMER_PASSWORD, UserRole::User).await;
  store.add_cart_quantity(user.id, catalog.peda.id, 1).await.expect("add");
  store.fail_order_item_insert_at(2);

  let items = json!([
    { "product_id": catalog.milk.id, "quantity": 1, "price": 60 },
    { "product_id": catalog.peda.id, "quantity": 1, "price": 400 },
  ]);
  let ctx = ContextData::new(PlaceOrderCtxData::new(state.clone(), user.id, payload(items, "phonepe")));
  let err = state.workflows.run(ctx).await.expect_err("second insert is injected to fail");
  assert!(matches!(err, AppError::Internal(_)));

  assert_eq!(store.order_count().await, 0);
  assert_eq!(store.order_item_count().await, 0);
  assert_eq!(store.cart_lines(user.id).await.expect("cart").len(), 1);

  // The store is usable again once injection is off.
  store.fail_order_item_insert_at(0);
  let items = json!([{ "product_id": catalog.peda.id, "quantity": 1, "price": 400 }]);
  let ctx = ContextData::new(PlaceOrderCtxData::new(state.clone(), user.id, payload(items, "cod")));
  let result = state.workflows.run(ctx).await.expect("order should go through");
  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(store.order_count().await, 1);
}

#[tokio::test]
#[serial]
async fn payment_status_follows_method() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let user = create_user(&store, "payer@example.com", CUSTOMER_PASSWORD, UserRole::User).await;

  for (method, expected) in [
    ("cod", PaymentStatus::Pending),
    ("phonepe", PaymentStatus::Verified),
    ("qrcode", PaymentStatus::Verified),
  ] {
    let items = json!([{ "product_id": catalog.milk.id, "quantity": 1, "price": 60 }]);
    let mut order_payload = payload(items, method);
    order_payload.transaction_id = Some("TXN-42".to_string());
    let ctx = ContextData::new(PlaceOrderCtxData::new(state.clone(), user.id, order_payload));
    state.workflows.run(ctx.clone()).await.expect("order should go through");

    let order_id = ctx.read().order_id.expect("order id");
    let order = order_queries::order_details(&store, user.id, order_id).await.expect("order");
    assert_eq!(order.order.payment_status, expected, "{}", method);
    assert_eq!(order.order.transaction_id.as_deref(), Some("TXN-42"));
  }
}

#[actix_rt::test]
#[serial]
async fn invalid_checkout_input_is_rejected_without_writes() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let (_user, token) = signed_in(&store, "sloppy@example.com", UserRole::User).await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let good_items = json!([{ "product_id": catalog.milk.id, "quantity": 1, "price": 60 }]);
  let mut missing_city = shipping_payload(good_items.clone(), "cod");
  missing_city["city"] = json!("");

  let cases = [
    (missing_city, "Missing required field: city"),
    (shipping_payload(good_items, "card"), "Invalid payment method: card"),
    (shipping_payload(json!([]), "cod"), "Missing required field: items"),
    (
      shipping_payload(json!([{ "product_id": catalog.milk.id, "quantity": 0, "price": 60 }]), "cod"),
      "Item 1: quantity must be at least 1",
    ),
  ];
  for (body, message) in cases {
    let req = test::TestRequest::post()
      .uri("/api/orders/place")
      .insert_header(bearer(&token))
      .set_json(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], message);
  }
  assert_eq!(store.order_count().await, 0);
}

#[actix_rt::test]
#[serial]
async fn oversized_orders_are_rejected_without_writes() {
  setup_tracing();
  let (store, state) = memory_state();
  let catalog = seed_catalog(&store).await;
  let (user, token) = signed_in(&store, "bulk@example.com", UserRole::User).await;
  store.add_cart_quantity(user.id, catalog.milk.id, 1).await.expect("add");
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let cases = [
    (
      json!([{ "product_id": catalog.milk.id, "quantity": 2147483647, "price": 60 }]),
      "Item 1: quantity must be at most 1000",
    ),
    (
      json!([
        { "product_id": catalog.milk.id, "quantity": 1000, "price": 5000000 },
        { "product_id": catalog.paneer.id, "quantity": 1000, "price": 5000000 },
      ]),
      "Order total exceeds the maximum supported amount",
    ),
  ];
  for (items, message) in cases {
    let req = test::TestRequest::post()
      .uri("/api/orders/place")
      .insert_header(bearer(&token))
      .set_json(shipping_payload(items, "cod"))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], message);
  }

  assert_eq!(store.order_count().await, 0);
  assert_eq!(store.order_item_count().await, 0);
  assert_eq!(store.cart_lines(user.id).await.expect("cart").len(), 1);
}

#[tokio::test]
#[serial]
async fn checkout_holds_the_store_until_commit() {
  setup_tracing();
  let store = dairyx::store::MemoryStore::new();
  let catalog = seed_catalog(&store).await;
  let user = create_user(&store, "racer@example.com", CUSTOMER_PASSWORD, UserRole::User).await;
  store.add_cart_quantity(user.id, catalog.milk.id, 2).await.expect("add");

  let mut tx = store.begin_order().await.expect("begin");
  assert_eq!(tx.lock_cart(user.id).await.expect("lock"), 1);

  let racing = store.clone();
  let product_id = catalog.paneer.id;
  let user_id = user.id;
  let late_add = tokio::spawn(async move { racing.add_cart_quantity(user_id, product_id, 3).await });
  tokio::time::sleep(std::time::Duration::from_millis(50)).await;
  assert!(!late_add.is_finished(), "cart writes wait for the open checkout");

  assert_eq!(tx.clear_cart(user.id).await.expect("clear"), 1);
  tx.commit().await.expect("commit");

  let added = late_add.await.expect("join").expect("add");
  assert_eq!(added, Some(3));
  let cart = store.cart_lines(user.id).await.expect("cart");
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].product_id, catalog.paneer.id);
  assert_eq!(cart[0].quantity, 3);
}
