// storefront/src/store/mod.rs

//! Persistence boundary. Services and pipelines talk to `dyn Store`; `PgStore`
//! backs production and `MemoryStore` backs tests and local demos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
  AdminCartLine, CartLine, Category, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItemView, OrderStatus, Principal,
  Product, Statistics, User, UserRole,
};

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Products returned per listing request.
pub const PRODUCT_LISTING_LIMIT: i64 = 50;

#[async_trait]
pub trait Store: Send + Sync {
  /// Short backend name reported by the health endpoint.
  fn backend_tag(&self) -> &'static str;

  async fn ping(&self) -> Result<()>;

  // --- Users ---
  async fn email_exists(&self, email: &str) -> Result<bool>;
  /// Fails with `Conflict` when the email is taken.
  async fn insert_user(&self, new_user: NewUser) -> Result<User>;
  async fn find_user_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>>;
  async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;
  /// Role `user` accounts, newest first.
  async fn list_customers(&self) -> Result<Vec<User>>;

  // --- Sessions ---
  async fn create_session(&self, token: &str, principal: Principal, expires_at: DateTime<Utc>) -> Result<()>;
  /// Expired and unknown tokens both resolve to `None`; an expired token is
  /// deleted on the way. `create_session` prunes every expired row.
  async fn resolve_session(&self, token: &str) -> Result<Option<Principal>>;
  async fn delete_session(&self, token: &str) -> Result<()>;

  // --- Catalog ---
  async fn list_categories(&self) -> Result<Vec<Category>>;
  /// Every product row regardless of status.
  async fn count_products(&self) -> Result<i64>;
  /// Active products, newest first, optionally filtered by category name
  /// (case-insensitive), capped at `PRODUCT_LISTING_LIMIT`.
  async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>>;
  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>>;
  /// Returns the id of the named category, creating it when absent.
  async fn ensure_category(&self, name: &str) -> Result<Uuid>;
  async fn insert_product(&self, new_product: NewProduct) -> Result<Product>;

  // --- Cart ---
  async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>>;
  /// Atomic upsert; returns the resulting quantity, or `None` (and changes
  /// nothing) when the row would exceed `MAX_ITEM_QUANTITY`.
  async fn add_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Option<i32>>;
  /// Returns the number of rows updated.
  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<u64>;
  /// Returns the number of rows deleted.
  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<u64>;
  async fn clear_cart(&self, user_id: Uuid) -> Result<u64>;
  async fn all_cart_lines(&self) -> Result<Vec<AdminCartLine>>;

  // --- Orders ---
  /// Opens the serializable transaction used by order placement.
  async fn begin_order(&self) -> Result<Box<dyn OrderTx>>;
  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
  async fn order_for_user(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>>;
  async fn order_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItemView>>;
  /// Every order with its owner's account email, newest first.
  async fn all_orders(&self) -> Result<Vec<(Order, String)>>;
  /// Returns the number of rows updated.
  async fn set_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<u64>;
  async fn statistics(&self) -> Result<Statistics>;
}

/// Writes staged by one order placement. Nothing is visible to other callers
/// until `commit`; dropping without commit discards every write.
#[async_trait]
pub trait OrderTx: Send {
  /// Locks the user's cart rows for the rest of the transaction; returns how many.
  async fn lock_cart(&mut self, user_id: Uuid) -> Result<u64>;
  async fn product_exists(&mut self, product_id: Uuid) -> Result<bool>;
  /// Oldest product with exactly this name.
  async fn product_id_by_name(&mut self, name: &str) -> Result<Option<Uuid>>;
  async fn insert_order(&mut self, new_order: &NewOrder) -> Result<()>;
  async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()>;
  async fn clear_cart(&mut self, user_id: Uuid) -> Result<u64>;
  async fn commit(self: Box<Self>) -> Result<()>;
  async fn rollback(self: Box<Self>) -> Result<()>;
}
