//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod customer;

pub use product::{Category, Product, ProductError, ProductImage, Subcategory, Variant};
pub use order::{AdminAction, LineItem, Order, OrderDraft, OrderError, OrderItem, OrderStatus};
pub use cart::{Cart, CartLine, CartLineRow};
pub use customer::{Customer, Profile};
