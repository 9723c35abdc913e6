// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::run_to_completion;
use crate::errors::AppError;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::pipelines::order_input::PlaceOrderPayload;
use crate::services::order_queries;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::ContextData;

#[derive(Deserialize, Debug)]
pub struct OrderDetailsQuery {
  pub order_id: Uuid,
}

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.principal.user_id, items = req_payload.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(PlaceOrderCtxData::new(
    app_state.get_ref().clone(),
    auth_user.principal.user_id,
    req_payload.into_inner(),
  ));

  run_to_completion(&app_state, &ctx, "Order placement").await?;

  let (order_id, total_amount) = {
    let guard = ctx.read();
    match (guard.committed, guard.order_id, guard.totals) {
      (true, Some(order_id), Some(totals)) => (order_id, totals.total_amount),
      _ => return Err(AppError::Internal("Order placement completed without a committed order.".to_string())),
    }
  };
  info!(%order_id, %total_amount, "Order placed.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Order placed successfully",
    "order_id": order_id,
    "total_amount": total_amount,
  })))
}

#[instrument(name = "handler::get_orders", skip_all, fields(user_id = %auth_user.principal.user_id))]
pub async fn get_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_queries::orders_for_user(app_state.store.as_ref(), auth_user.principal.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::order_details", skip_all, fields(order_id = %query.order_id))]
pub async fn order_details_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderDetailsQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order =
    order_queries::order_details(app_state.store.as_ref(), auth_user.principal.user_id, query.order_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}
