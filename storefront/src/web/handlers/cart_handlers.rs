// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::run_to_completion;
use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::ContextData;

fn default_quantity() -> i32 {
  1
}

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartRequestPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct CartItemRequestPayload {
  pub product_id: Uuid,
}

#[instrument(name = "handler::get_cart", skip_all, fields(user_id = %auth_user.principal.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = cart_service::get_cart(app_state.store.as_ref(), auth_user.principal.user_id).await?;
  let total: Decimal = items.iter().map(|line| line.price * Decimal::from(line.quantity)).sum();
  let count: i64 = items.iter().map(|line| i64::from(line.quantity)).sum();
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "items": items,
    "total": total,
    "count": count,
  })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.principal.user_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    authenticated_user_id: auth_user.principal.user_id,
    product_id: req_payload.product_id,
    quantity: req_payload.quantity,
    new_quantity: None,
  });

  run_to_completion(&app_state, &ctx, "Add to cart").await?;

  let new_quantity = ctx
    .read()
    .new_quantity
    .ok_or_else(|| AppError::Internal("Cart update completed without a quantity.".to_string()))?;
  info!(new_quantity, "Add to cart successful.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Item added to cart",
    "product_id": req_payload.product_id,
    "quantity": new_quantity,
  })))
}

#[instrument(name = "handler::update_cart", skip_all, fields(user_id = %auth_user.principal.user_id))]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart_service::update_quantity(
    app_state.store.as_ref(),
    auth_user.principal.user_id,
    req_payload.product_id,
    req_payload.quantity,
  )
  .await?;
  let message = if req_payload.quantity <= 0 { "Item removed from cart" } else { "Cart updated" };
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": message })))
}

#[instrument(name = "handler::delete_cart_item", skip_all, fields(user_id = %auth_user.principal.user_id))]
pub async fn delete_cart_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CartItemRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart_service::remove_item(app_state.store.as_ref(), auth_user.principal.user_id, req_payload.product_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Item removed from cart" })))
}

#[instrument(name = "handler::clear_cart", skip_all, fields(user_id = %auth_user.principal.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let removed = cart_service::clear_cart(app_state.store.as_ref(), auth_user.principal.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Cart cleared", "removed": removed })))
}
