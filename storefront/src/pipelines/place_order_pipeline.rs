// storefront/src/pipelines/place_order_pipeline.rs

//! Checkout: turns the submitted items into an order with line items and
//! empties the cart, all inside one serializable transaction.
//!
//! The open transaction lives in `PlaceOrderCtxData::tx`. A step that fails
//! while holding it rolls it back before returning the error, so a failed run
//! leaves no order rows and an untouched cart.

use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::pipelines::order_input::{validate_place_order, OrderLine, ProductRef};
use crate::services::pricing;
use crate::store::OrderTx;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

async fn abort_order(tx: Box<dyn OrderTx>, err: AppError) -> AppError {
  if let Err(rollback_err) = tx.rollback().await {
    error!(error = %rollback_err, "Rolling back the order transaction failed.");
  }
  warn!(error = %err, "Order transaction rolled back.");
  err
}

fn missing(what: &str) -> AppError {
  AppError::Internal(format!("Place order step ran before {} was set.", what))
}

/// Resolves the line's product inside the transaction and inserts it.
async fn insert_line(
  tx: &mut Box<dyn OrderTx>,
  order_id: Uuid,
  position: usize,
  line: &OrderLine,
) -> Result<(), AppError> {
  let product_id = match &line.product {
    ProductRef::Id(id) => {
      if !tx.product_exists(*id).await? {
        return Err(AppError::NotFound(format!("Product not found for item {}: {}", position, id)));
      }
      *id
    }
    ProductRef::Name(name) => tx
      .product_id_by_name(name)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product not found for item {}: {}", position, name)))?,
  };
  tx.insert_order_item(&NewOrderItem {
    order_id,
    product_id,
    quantity: line.quantity,
    unit_price: line.unit_price,
  })
  .await
}

pub fn register_place_order_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_input", false),
    ("compute_order_totals", false),
    ("open_order_transaction", false),
    ("lock_user_cart", false),
    ("insert_order_header", false),
    ("insert_order_items", false),
    ("clear_user_cart", false),
    ("commit_order_transaction", false),
  ]);

  p.on_root("validate_order_input", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let request = {
        let guard = ctx_data.read();
        validate_place_order(&guard.payload)?
      };
      debug!(lines = request.lines.len(), "Order input validated.");
      ctx_data.write().request = Some(request);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("compute_order_totals", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let totals = {
        let request = guard.request.as_ref().ok_or_else(|| missing("request"))?;
        pricing::compute_totals(request.lines.iter().map(|l| (l.unit_price, l.quantity)))?
      };
      info!(
        subtotal = %totals.subtotal,
        tax = %totals.tax_amount,
        total = %totals.total_amount,
        "Order totals computed."
      );
      guard.totals = Some(totals);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("open_order_transaction", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let store = { ctx_data.read().app_state.store.clone() };
      let tx = store.begin_order().await?;
      ctx_data.read().tx.put(tx);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("lock_user_cart", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (user_id, mut tx) = {
        let guard = ctx_data.read();
        (guard.authenticated_user_id, guard.tx.take()?)
      };

      let lock_result = tx.lock_cart(user_id).await;
      match lock_result {
        Ok(locked) => {
          let mut guard = ctx_data.write();
          guard.cart_rows_locked = locked;
          guard.tx.put(tx);
          Ok(PipelineControl::Continue)
        }
        Err(e) => Err(abort_order(tx, e).await),
      }
    })
  });

  p.on_root("insert_order_header", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (new_order, mut tx) = {
        let guard = ctx_data.read();
        let request = guard.request.as_ref().ok_or_else(|| missing("request"))?;
        let totals = guard.totals.ok_or_else(|| missing("totals"))?;
        let shipping = &request.shipping;
        let new_order = NewOrder {
          id: Uuid::new_v4(),
          user_id: guard.authenticated_user_id,
          fullname: shipping.fullname.clone(),
          phone: shipping.phone.clone(),
          email: shipping.email.clone(),
          address: shipping.address.clone(),
          city: shipping.city.clone(),
          state: shipping.state.clone(),
          pincode: shipping.pincode.clone(),
          landmark: shipping.landmark.clone(),
          total_amount: totals.total_amount,
          delivery_fee: totals.delivery_fee,
          tax_amount: totals.tax_amount,
          payment_method: request.payment_method,
          payment_status: request.payment_method.initial_payment_status(),
          transaction_id: request.transaction_id.clone(),
        };
        (new_order, guard.tx.take()?)
      };

      let insert_result = tx.insert_order(&new_order).await;
      match insert_result {
        Ok(()) => {
          let mut guard = ctx_data.write();
          guard.order_id = Some(new_order.id);
          guard.tx.put(tx);
          info!(order_id = %new_order.id, "Order header inserted.");
          Ok(PipelineControl::Continue)
        }
        Err(e) => Err(abort_order(tx, e).await),
      }
    })
  });

  p.on_root("insert_order_items", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (order_id, lines, mut tx) = {
        let guard = ctx_data.read();
        let order_id = guard.order_id.ok_or_else(|| missing("order id"))?;
        let lines = guard.request.as_ref().ok_or_else(|| missing("request"))?.lines.clone();
        (order_id, lines, guard.tx.take()?)
      };

      for (idx, line) in lines.iter().enumerate() {
        let line_result = insert_line(&mut tx, order_id, idx + 1, line).await;
        if let Err(e) = line_result {
          return Err(abort_order(tx, e).await);
        }
      }

      let mut guard = ctx_data.write();
      guard.items_written = lines.len();
      guard.tx.put(tx);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("clear_user_cart", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (user_id, mut tx) = {
        let guard = ctx_data.read();
        (guard.authenticated_user_id, guard.tx.take()?)
      };

      let clear_result = tx.clear_cart(user_id).await;
      match clear_result {
        Ok(cleared) => {
          let mut guard = ctx_data.write();
          guard.cart_rows_cleared = cleared;
          guard.tx.put(tx);
          Ok(PipelineControl::Continue)
        }
        Err(e) => Err(abort_order(tx, e).await),
      }
    })
  });

  p.on_root("commit_order_transaction", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let tx = { ctx_data.read().tx.take()? };
      tx.commit().await?;

      let mut guard = ctx_data.write();
      guard.committed = true;
      info!(
        order_id = ?guard.order_id,
        items = guard.items_written,
        cart_rows_cleared = guard.cart_rows_cleared,
        "Order committed."
      );
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(p);
  info!("Place-order pipeline registered.");
}
