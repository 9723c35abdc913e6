// storefront/src/pipelines/contexts.rs

//! Context data structs for every pipeline. Handlers receive these wrapped in
//! `ContextData`.

use parking_lot::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::order_input::{PlaceOrderPayload, PlaceOrderRequest};
use crate::services::pricing::OrderTotals;
use crate::state::AppState;
use crate::store::OrderTx;

pub struct SignupCtxData {
  pub app_state: AppState,
  pub fullname: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub created_user: Option<User>,
  pub session_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninAudience {
  Customer,
  /// Admin dashboard login; accepts the configured admin username alias.
  Admin,
}

pub struct SigninCtxData {
  pub app_state: AppState,
  pub audience: SigninAudience,
  /// Email, or for admins possibly the username alias.
  pub identifier: String,
  pub password: String,
  pub resolved_email: Option<String>,
  pub user: Option<User>,
  pub session_token: Option<String>,
}

pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub new_quantity: Option<i32>,
}

/// Holder for the open order transaction. Steps take it out, use it across
/// their awaits and put it back; dropping it unreturned rolls back.
#[derive(Default)]
pub struct OrderTxSlot(Mutex<Option<Box<dyn OrderTx>>>);

impl OrderTxSlot {
  pub fn put(&self, tx: Box<dyn OrderTx>) {
    *self.0.lock() = Some(tx);
  }

  pub fn take(&self) -> Result<Box<dyn OrderTx>, AppError> {
    self
      .0
      .lock()
      .take()
      .ok_or_else(|| AppError::Internal("Order transaction is not open.".to_string()))
  }

  pub fn is_open(&self) -> bool {
    self.0.lock().is_some()
  }
}

pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  pub payload: PlaceOrderPayload,
  pub request: Option<PlaceOrderRequest>,
  pub totals: Option<OrderTotals>,
  pub tx: OrderTxSlot,
  pub cart_rows_locked: u64,
  pub order_id: Option<Uuid>,
  pub items_written: usize,
  pub cart_rows_cleared: u64,
  pub committed: bool,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, authenticated_user_id: Uuid, payload: PlaceOrderPayload) -> Self {
    Self {
      app_state,
      authenticated_user_id,
      payload,
      request: None,
      totals: None,
      tx: OrderTxSlot::default(),
      cart_rows_locked: 0,
      order_id: None,
      items_written: 0,
      cart_rows_cleared: 0,
      committed: false,
    }
  }
}
