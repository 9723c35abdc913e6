// storefront/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::admin_service;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusPayload {
  pub order_id: Uuid,
  pub status: String,
}

#[instrument(name = "handler::admin_users", skip_all)]
pub async fn list_users_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let users = admin_service::list_customers(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "users": users })))
}

#[instrument(name = "handler::admin_carts", skip_all)]
pub async fn list_carts_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let carts = admin_service::list_cart_lines(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "carts": carts })))
}

#[instrument(name = "handler::admin_orders", skip_all)]
pub async fn list_orders_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let orders = admin_service::list_orders(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::admin_statistics", skip_all)]
pub async fn statistics_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let statistics = admin_service::statistics(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "statistics": statistics })))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, req_payload, admin),
  fields(admin_id = %admin.0.principal.user_id, order_id = %req_payload.order_id)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateOrderStatusPayload>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let status =
    admin_service::update_order_status(app_state.store.as_ref(), req_payload.order_id, &req_payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Order status updated",
    "order_id": req_payload.order_id,
    "status": status,
  })))
}
