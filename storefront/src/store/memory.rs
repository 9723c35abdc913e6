// storefront/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{OrderTx, Store, PRODUCT_LISTING_LIMIT};
use crate::errors::{AppError, Result};
use crate::models::{
  AdminCartLine, CartItem, CartLine, Category, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem,
  OrderItemView, OrderStatus, Principal, Product, ProductStatus, Session, Statistics, User, UserRole,
  MAX_ITEM_QUANTITY,
};

/// Rows are kept in insertion order; "newest first" reads iterate in reverse.
#[derive(Debug, Clone, Default)]
struct MemoryState {
  users: Vec<User>,
  sessions: HashMap<String, Session>,
  categories: Vec<Category>,
  products: Vec<Product>,
  cart: Vec<CartItem>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
}

impl MemoryState {
  fn product(&self, product_id: Uuid) -> Option<&Product> {
    self.products.iter().find(|p| p.id == product_id)
  }

  fn items_for(&self, order_ids: &[Uuid]) -> Vec<OrderItemView> {
    self
      .order_items
      .iter()
      .filter(|item| order_ids.contains(&item.order_id))
      .filter_map(|item| {
        let product = self.product(item.product_id)?;
        Some(OrderItemView {
          order_id: item.order_id,
          product_id: item.product_id,
          name: product.name.clone(),
          quantity: item.quantity,
          price: item.unit_price,
          image: product.image.clone(),
        })
      })
      .collect()
  }
}

/// In-process backend with the same semantics as `PgStore`. An open order
/// transaction holds the state lock until it commits or is dropped.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
  fail_item_insert_at: Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes the `n`th order item insert of every later transaction fail
  /// (1-based). `0` turns injection off.
  pub fn fail_order_item_insert_at(&self, n: usize) {
    self.fail_item_insert_at.store(n, Ordering::SeqCst);
  }

  pub async fn order_count(&self) -> usize {
    self.state.lock().await.orders.len()
  }

  pub async fn order_item_count(&self) -> usize {
    self.state.lock().await.order_items.len()
  }

  /// Stored sessions, live or not.
  pub async fn session_count(&self) -> usize {
    self.state.lock().await.sessions.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  fn backend_tag(&self) -> &'static str {
    "memory"
  }

  async fn ping(&self) -> Result<()> {
    Ok(())
  }

  async fn email_exists(&self, email: &str) -> Result<bool> {
    Ok(self.state.lock().await.users.iter().any(|u| u.email == email))
  }

  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    let mut state = self.state.lock().await;
    if state.users.iter().any(|u| u.email == new_user.email) {
      return Err(AppError::Conflict("Email already registered".to_string()));
    }
    let user = User {
      id: Uuid::new_v4(),
      fullname: new_user.fullname,
      email: new_user.email,
      phone: new_user.phone,
      password_hash: new_user.password_hash,
      role: new_user.role,
      created_at: Utc::now(),
    };
    state.users.push(user.clone());
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>> {
    let state = self.state.lock().await;
    Ok(state.users.iter().find(|u| u.email == email && u.role == role).cloned())
  }

  async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
    Ok(self.state.lock().await.users.iter().find(|u| u.id == user_id).cloned())
  }

  async fn list_customers(&self) -> Result<Vec<User>> {
    let state = self.state.lock().await;
    Ok(state.users.iter().rev().filter(|u| u.role == UserRole::User).cloned().collect())
  }

  async fn create_session(&self, token: &str, principal: Principal, expires_at: DateTime<Utc>) -> Result<()> {
    let session = Session {
      token: token.to_string(),
      user_id: principal.user_id,
      role: principal.role,
      created_at: Utc::now(),
      expires_at,
    };
    let mut state = self.state.lock().await;
    let now = session.created_at;
    state.sessions.retain(|_, s| s.is_live_at(now));
    state.sessions.insert(token.to_string(), session);
    Ok(())
  }

  async fn resolve_session(&self, token: &str) -> Result<Option<Principal>> {
    let mut state = self.state.lock().await;
    let now = Utc::now();
    let live = state.sessions.get(token).map(|s| s.is_live_at(now).then(|| s.principal()));
    match live {
      Some(Some(principal)) => Ok(Some(principal)),
      Some(None) => {
        state.sessions.remove(token);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    self.state.lock().await.sessions.remove(token);
    Ok(())
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let mut categories = self.state.lock().await.categories.clone();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
  }

  async fn count_products(&self) -> Result<i64> {
    Ok(self.state.lock().await.products.len() as i64)
  }

  async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>> {
    let wanted = category.map(str::to_lowercase);
    let state = self.state.lock().await;
    Ok(
      state
        .products
        .iter()
        .rev()
        .filter(|p| p.status == ProductStatus::Active)
        .filter(|p| wanted.as_deref().map_or(true, |w| p.category.to_lowercase() == w))
        .take(PRODUCT_LISTING_LIMIT as usize)
        .cloned()
        .collect(),
    )
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
    Ok(self.state.lock().await.product(product_id).cloned())
  }

  async fn ensure_category(&self, name: &str) -> Result<Uuid> {
    let mut state = self.state.lock().await;
    if let Some(existing) = state.categories.iter().find(|c| c.name == name) {
      return Ok(existing.id);
    }
    let id = Uuid::new_v4();
    state.categories.push(Category {
      id,
      name: name.to_string(),
    });
    Ok(id)
  }

  async fn insert_product(&self, new_product: NewProduct) -> Result<Product> {
    let mut state = self.state.lock().await;
    let category = state
      .categories
      .iter()
      .find(|c| c.id == new_product.category_id)
      .map(|c| c.name.clone())
      .ok_or_else(|| AppError::Validation(format!("Unknown category {}", new_product.category_id)))?;
    let product = Product {
      id: Uuid::new_v4(),
      name: new_product.name,
      price: new_product.price,
      image: new_product.image,
      category_id: new_product.category_id,
      category,
      status: new_product.status,
      created_at: Utc::now(),
    };
    state.products.push(product.clone());
    Ok(product)
  }

  async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
    let state = self.state.lock().await;
    Ok(
      state
        .cart
        .iter()
        .rev()
        .filter(|ci| ci.user_id == user_id)
        .filter_map(|ci| {
          let product = state.product(ci.product_id)?;
          Some(CartLine {
            cart_id: ci.id,
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: ci.quantity,
            added_at: ci.added_at,
          })
        })
        .collect(),
    )
  }

  async fn add_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Option<i32>> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
      return Ok(None);
    }
    let mut state = self.state.lock().await;
    if let Some(existing) = state
      .cart
      .iter_mut()
      .find(|ci| ci.user_id == user_id && ci.product_id == product_id)
    {
      let Some(summed) = existing.quantity.checked_add(quantity).filter(|q| *q <= MAX_ITEM_QUANTITY) else {
        return Ok(None);
      };
      existing.quantity = summed;
      return Ok(Some(summed));
    }
    state.cart.push(CartItem {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      quantity,
      added_at: Utc::now(),
    });
    Ok(Some(quantity))
  }

  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<u64> {
    let mut state = self.state.lock().await;
    let mut updated = 0;
    for ci in state
      .cart
      .iter_mut()
      .filter(|ci| ci.user_id == user_id && ci.product_id == product_id)
    {
      ci.quantity = quantity;
      updated += 1;
    }
    Ok(updated)
  }

  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<u64> {
    let mut state = self.state.lock().await;
    let before = state.cart.len();
    state.cart.retain(|ci| !(ci.user_id == user_id && ci.product_id == product_id));
    Ok((before - state.cart.len()) as u64)
  }

  async fn clear_cart(&self, user_id: Uuid) -> Result<u64> {
    let mut state = self.state.lock().await;
    let before = state.cart.len();
    state.cart.retain(|ci| ci.user_id != user_id);
    Ok((before - state.cart.len()) as u64)
  }

  async fn all_cart_lines(&self) -> Result<Vec<AdminCartLine>> {
    let state = self.state.lock().await;
    Ok(
      state
        .cart
        .iter()
        .rev()
        .filter_map(|ci| {
          let user = state.users.iter().find(|u| u.id == ci.user_id)?;
          let product = state.product(ci.product_id)?;
          Some(AdminCartLine {
            cart_id: ci.id,
            user_id: user.id,
            user_email: user.email.clone(),
            user_name: user.fullname.clone(),
            product_id: product.id,
            product_name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: ci.quantity,
            total_price: product.price * Decimal::from(ci.quantity),
            added_at: ci.added_at,
          })
        })
        .collect(),
    )
  }

  async fn begin_order(&self) -> Result<Box<dyn OrderTx>> {
    let guard = Arc::clone(&self.state).lock_owned().await;
    let staged = guard.clone();
    let fail_item_at = match self.fail_item_insert_at.load(Ordering::SeqCst) {
      0 => None,
      n => Some(n),
    };
    Ok(Box::new(MemoryOrderTx {
      guard,
      staged,
      items_inserted: 0,
      fail_item_at,
    }))
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let state = self.state.lock().await;
    Ok(state.orders.iter().rev().filter(|o| o.user_id == user_id).cloned().collect())
  }

  async fn order_for_user(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>> {
    let state = self.state.lock().await;
    Ok(state.orders.iter().find(|o| o.id == order_id && o.user_id == user_id).cloned())
  }

  async fn order_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItemView>> {
    Ok(self.state.lock().await.items_for(order_ids))
  }

  async fn all_orders(&self) -> Result<Vec<(Order, String)>> {
    let state = self.state.lock().await;
    Ok(
      state
        .orders
        .iter()
        .rev()
        .filter_map(|o| {
          let owner = state.users.iter().find(|u| u.id == o.user_id)?;
          Some((o.clone(), owner.email.clone()))
        })
        .collect(),
    )
  }

  async fn set_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<u64> {
    let mut state = self.state.lock().await;
    match state.orders.iter_mut().find(|o| o.id == order_id) {
      Some(order) => {
        order.status = status;
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn statistics(&self) -> Result<Statistics> {
    let state = self.state.lock().await;
    let count = |n: usize| n as i64;
    Ok(Statistics {
      total_users: count(state.users.iter().filter(|u| u.role == UserRole::User).count()),
      total_orders: count(state.orders.len()),
      total_revenue: state
        .orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum(),
      total_products: count(state.products.iter().filter(|p| p.status == ProductStatus::Active).count()),
      pending_orders: count(state.orders.iter().filter(|o| o.status == OrderStatus::Pending).count()),
    })
  }
}

struct MemoryOrderTx {
  guard: OwnedMutexGuard<MemoryState>,
  staged: MemoryState,
  items_inserted: usize,
  fail_item_at: Option<usize>,
}

#[async_trait]
impl OrderTx for MemoryOrderTx {
  async fn lock_cart(&mut self, user_id: Uuid) -> Result<u64> {
    // The whole state is already held by `guard`.
    Ok(self.staged.cart.iter().filter(|ci| ci.user_id == user_id).count() as u64)
  }

  async fn product_exists(&mut self, product_id: Uuid) -> Result<bool> {
    Ok(self.staged.product(product_id).is_some())
  }

  async fn product_id_by_name(&mut self, name: &str) -> Result<Option<Uuid>> {
    Ok(self.staged.products.iter().find(|p| p.name == name).map(|p| p.id))
  }

  async fn insert_order(&mut self, new_order: &NewOrder) -> Result<()> {
    self.staged.orders.push(Order {
      id: new_order.id,
      user_id: new_order.user_id,
      fullname: new_order.fullname.clone(),
      phone: new_order.phone.clone(),
      email: new_order.email.clone(),
      address: new_order.address.clone(),
      city: new_order.city.clone(),
      state: new_order.state.clone(),
      pincode: new_order.pincode.clone(),
      landmark: new_order.landmark.clone(),
      total_amount: new_order.total_amount,
      delivery_fee: new_order.delivery_fee,
      tax_amount: new_order.tax_amount,
      status: OrderStatus::Pending,
      payment_method: new_order.payment_method,
      payment_status: new_order.payment_status,
      transaction_id: new_order.transaction_id.clone(),
      order_date: Utc::now(),
    });
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()> {
    if self.fail_item_at == Some(self.items_inserted + 1) {
      return Err(AppError::Internal(format!(
        "Injected failure on order item insert #{}",
        self.items_inserted + 1
      )));
    }
    if !self.staged.orders.iter().any(|o| o.id == item.order_id) {
      return Err(AppError::Internal(format!("Order {} not staged", item.order_id)));
    }
    self.staged.order_items.push(OrderItem {
      id: Uuid::new_v4(),
      order_id: item.order_id,
      product_id: item.product_id,
      quantity: item.quantity,
      unit_price: item.unit_price,
    });
    self.items_inserted += 1;
    Ok(())
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> Result<u64> {
    let before = self.staged.cart.len();
    self.staged.cart.retain(|ci| ci.user_id != user_id);
    Ok((before - self.staged.cart.len()) as u64)
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    let MemoryOrderTx { mut guard, staged, .. } = *self;
    *guard = staged;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    Ok(())
  }
}
