// storefront/src/models/mod.rs

//! Data structures for database rows and the read-side projections built from them.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod session;
pub mod statistics;
pub mod user;

pub use cart_item::{AdminCartLine, CartItem, CartLine, MAX_ITEM_QUANTITY};
pub use order::{NewOrder, Order, OrderStatus, OrderWithItems, PaymentMethod, PaymentStatus};
pub use order_item::{NewOrderItem, OrderItem, OrderItemView};
pub use product::{Category, NewProduct, Product, ProductStatus};
pub use session::{Principal, Session};
pub use statistics::Statistics;
pub use user::{NewUser, User, UserRole};
