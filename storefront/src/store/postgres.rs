// storefront/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{OrderTx, Store, PRODUCT_LISTING_LIMIT};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{
  AdminCartLine, CartLine, Category, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItemView, OrderStatus,
  Principal, Product, Statistics, User, UserRole, MAX_ITEM_QUANTITY,
};

const USER_COLUMNS: &str = "id, fullname, email, phone, password_hash, role, created_at";

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.price, p.image, p.category_id, c.name AS category, p.status, p.created_at \
   FROM products p JOIN categories c ON c.id = p.category_id";

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.fullname, o.phone, o.email, o.address, o.city, o.state, o.pincode, \
   o.landmark, o.total_amount, o.delivery_fee, o.tax_amount, o.status, o.payment_method, o.payment_status, \
   o.transaction_id, o.order_date";

#[derive(FromRow)]
struct OrderWithEmailRow {
  #[sqlx(flatten)]
  order: Order,
  user_email: String,
}

/// PostgreSQL backend over a shared `sqlx` pool.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(config: &AppConfig) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(config.database_max_connections)
      .connect(&config.database_url)
      .await?;
    info!(max_connections = config.database_max_connections, "Connected to the database.");
    Ok(Self::new(pool))
  }

  pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(&self.pool).await
  }
}

#[async_trait]
impl Store for PgStore {
  fn backend_tag(&self) -> &'static str {
    "postgres"
  }

  async fn ping(&self) -> Result<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }

  async fn email_exists(&self, email: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
      .bind(email)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  #[instrument(name = "pg_store::insert_user", skip(self, new_user), fields(email = %new_user.email), err(Display))]
  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    let sql = format!(
      "INSERT INTO users (id, fullname, email, phone, password_hash, role) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_user.fullname)
      .bind(&new_user.email)
      .bind(&new_user.phone)
      .bind(&new_user.password_hash)
      .bind(new_user.role)
      .fetch_one(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = $1 AND role = $2", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
      .bind(email)
      .bind(role)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn list_customers(&self) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM users WHERE role = 'user' ORDER BY created_at DESC, id",
      USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
  }

  async fn create_session(&self, token: &str, principal: Principal, expires_at: DateTime<Utc>) -> Result<()> {
    let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
      .execute(&self.pool)
      .await?
      .rows_affected();
    if pruned > 0 {
      debug!(pruned, "Pruned expired sessions.");
    }
    sqlx::query("INSERT INTO sessions (token, user_id, role, expires_at) VALUES ($1, $2, $3, $4)")
      .bind(token)
      .bind(principal.user_id)
      .bind(principal.role)
      .bind(expires_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn resolve_session(&self, token: &str) -> Result<Option<Principal>> {
    let row = sqlx::query_as::<_, (Uuid, UserRole)>(
      "SELECT user_id, role FROM sessions WHERE token = $1 AND expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;
    if row.is_none() {
      sqlx::query("DELETE FROM sessions WHERE token = $1 AND expires_at <= NOW()")
        .bind(token)
        .execute(&self.pool)
        .await?;
    }
    Ok(row.map(|(user_id, role)| Principal { user_id, role }))
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(
      sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn count_products(&self) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>> {
    let sql = format!(
      "{} WHERE p.status = 'active' AND ($1::text IS NULL OR LOWER(c.name) = LOWER($1)) \
       ORDER BY p.created_at DESC, p.id LIMIT $2",
      PRODUCT_SELECT
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(category)
        .bind(PRODUCT_LISTING_LIMIT)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
    let sql = format!("{} WHERE p.id = $1", PRODUCT_SELECT);
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn ensure_category(&self, name: &str) -> Result<Uuid> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    let id = sqlx::query_scalar::<_, Uuid>(
      "INSERT INTO categories (id, name) VALUES ($1, $2) \
       ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(&self.pool)
    .await?;
    Ok(id)
  }

  async fn insert_product(&self, new_product: NewProduct) -> Result<Product> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO products (id, name, price, image, category_id, status) VALUES ($1, $2, $3, $4, $5, $6)")
      .bind(id)
      .bind(&new_product.name)
      .bind(new_product.price)
      .bind(&new_product.image)
      .bind(new_product.category_id)
      .bind(new_product.status)
      .execute(&self.pool)
      .await?;
    self
      .find_product(id)
      .await?
      .ok_or_else(|| AppError::Internal(format!("Product {} missing right after insert", id)))
  }

  async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
    Ok(
      sqlx::query_as::<_, CartLine>(
        "SELECT ct.id AS cart_id, p.id AS product_id, p.name, p.price, p.image, c.name AS category, \
         ct.quantity, ct.added_at \
         FROM cart ct JOIN products p ON p.id = ct.product_id JOIN categories c ON c.id = p.category_id \
         WHERE ct.user_id = $1 ORDER BY ct.added_at DESC, ct.id",
      )
      .bind(user_id)
      .fetch_all(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "pg_store::add_cart_quantity", skip(self), err(Display))]
  async fn add_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Option<i32>> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
      return Ok(None);
    }
    // The conflict branch skips the update (and returns no row) past the cap.
    let new_quantity = sqlx::query_scalar::<_, i32>(
      "INSERT INTO cart (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
       ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity \
       WHERE cart.quantity::BIGINT + EXCLUDED.quantity <= $5 \
       RETURNING quantity",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(i64::from(MAX_ITEM_QUANTITY))
    .fetch_optional(&self.pool)
    .await?;
    Ok(new_quantity)
  }

  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<u64> {
    let done = sqlx::query("UPDATE cart SET quantity = $3 WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .bind(quantity)
      .execute(&self.pool)
      .await?;
    Ok(done.rows_affected())
  }

  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<u64> {
    let done = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    Ok(done.rows_affected())
  }

  async fn clear_cart(&self, user_id: Uuid) -> Result<u64> {
    let done = sqlx::query("DELETE FROM cart WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(done.rows_affected())
  }

  async fn all_cart_lines(&self) -> Result<Vec<AdminCartLine>> {
    Ok(
      sqlx::query_as::<_, AdminCartLine>(
        "SELECT ct.id AS cart_id, u.id AS user_id, u.email AS user_email, u.fullname AS user_name, \
         p.id AS product_id, p.name AS product_name, p.price, p.image, ct.quantity, \
         p.price * ct.quantity AS total_price, ct.added_at \
         FROM cart ct JOIN users u ON u.id = ct.user_id JOIN products p ON p.id = ct.product_id \
         ORDER BY ct.added_at DESC, ct.id",
      )
      .fetch_all(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "pg_store::begin_order", skip(self), err(Display))]
  async fn begin_order(&self) -> Result<Box<dyn OrderTx>> {
    let mut tx = self.pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
      .execute(&mut *tx)
      .await?;
    debug!("Serializable order transaction opened.");
    Ok(Box::new(PgOrderTx { tx }))
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders o WHERE o.user_id = $1 ORDER BY o.order_date DESC, o.id",
      ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn order_for_user(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders o WHERE o.id = $1 AND o.user_id = $2", ORDER_COLUMNS);
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn order_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItemView>> {
    if order_ids.is_empty() {
      return Ok(Vec::new());
    }
    Ok(
      sqlx::query_as::<_, OrderItemView>(
        "SELECT oi.order_id, oi.product_id, p.name, oi.quantity, oi.unit_price AS price, p.image \
         FROM order_items oi JOIN products p ON p.id = oi.product_id \
         WHERE oi.order_id = ANY($1) ORDER BY oi.order_id, p.name",
      )
      .bind(order_ids)
      .fetch_all(&self.pool)
      .await?,
    )
  }

  async fn all_orders(&self) -> Result<Vec<(Order, String)>> {
    let sql = format!(
      "SELECT {}, u.email AS user_email FROM orders o JOIN users u ON u.id = o.user_id \
       ORDER BY o.order_date DESC, o.id",
      ORDER_COLUMNS
    );
    let rows = sqlx::query_as::<_, OrderWithEmailRow>(&sql).fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(|r| (r.order, r.user_email)).collect())
  }

  #[instrument(name = "pg_store::set_order_status", skip(self), err(Display))]
  async fn set_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<u64> {
    let done = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
      .bind(order_id)
      .bind(status)
      .execute(&self.pool)
      .await?;
    Ok(done.rows_affected())
  }

  async fn statistics(&self) -> Result<Statistics> {
    Ok(
      sqlx::query_as::<_, Statistics>(
        "SELECT \
           (SELECT COUNT(*) FROM users WHERE role = 'user') AS total_users, \
           (SELECT COUNT(*) FROM orders) AS total_orders, \
           (SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status <> 'cancelled') AS total_revenue, \
           (SELECT COUNT(*) FROM products WHERE status = 'active') AS total_products, \
           (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders",
      )
      .fetch_one(&self.pool)
      .await?,
    )
  }
}

struct PgOrderTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTx for PgOrderTx {
  async fn lock_cart(&mut self, user_id: Uuid) -> Result<u64> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM cart WHERE user_id = $1 FOR UPDATE")
      .bind(user_id)
      .fetch_all(&mut *self.tx)
      .await?;
    Ok(locked.len() as u64)
  }

  async fn product_exists(&mut self, product_id: Uuid) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
      .bind(product_id)
      .fetch_one(&mut *self.tx)
      .await?;
    Ok(exists)
  }

  async fn product_id_by_name(&mut self, name: &str) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE name = $1 ORDER BY created_at, id LIMIT 1")
      .bind(name)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(id)
  }

  async fn insert_order(&mut self, new_order: &NewOrder) -> Result<()> {
    sqlx::query(
      "INSERT INTO orders (id, user_id, fullname, phone, email, address, city, state, pincode, landmark, \
       total_amount, delivery_fee, tax_amount, status, payment_method, payment_status, transaction_id) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(new_order.id)
    .bind(new_order.user_id)
    .bind(&new_order.fullname)
    .bind(&new_order.phone)
    .bind(&new_order.email)
    .bind(&new_order.address)
    .bind(&new_order.city)
    .bind(&new_order.state)
    .bind(&new_order.pincode)
    .bind(&new_order.landmark)
    .bind(new_order.total_amount)
    .bind(new_order.delivery_fee)
    .bind(new_order.tax_amount)
    .bind(OrderStatus::Pending)
    .bind(new_order.payment_method)
    .bind(new_order.payment_status)
    .bind(&new_order.transaction_id)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()> {
    sqlx::query("INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4, $5)")
      .bind(Uuid::new_v4())
      .bind(item.order_id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.unit_price)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> Result<u64> {
    let done = sqlx::query("DELETE FROM cart WHERE user_id = $1")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(done.rows_affected())
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    let PgOrderTx { tx } = *self;
    tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    let PgOrderTx { tx } = *self;
    tx.rollback().await?;
    Ok(())
  }
}
