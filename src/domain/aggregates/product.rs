//! Catalog: categories, subcategories, products and their variants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Telegram photo attached to a product; the lowest `position` is the cover.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub file_id: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// A purchasable SKU of a product. `price` is in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i64,
    pub image_file_id: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Variant {
    pub fn price(&self, currency: &str) -> Money { Money::from_minor(self.price, currency) }
    pub fn stock(&self) -> Quantity { Quantity::from_column(self.stock) }
    pub fn is_in_stock(&self) -> bool { self.is_active && !self.stock().is_zero() }

    /// Checks that `requested` units in total can be held against current stock.
    pub fn ensure_available(&self, requested: u32) -> Result<(), ProductError> {
        if !self.is_active { return Err(ProductError::Inactive); }
        if requested == 0 { return Err(ProductError::InvalidQuantity); }
        self.stock()
            .subtract(requested)
            .map(|_| ())
            .ok_or(ProductError::InsufficientStock { requested, available: self.stock().value() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("variant is no longer sold")]
    Inactive,
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
}
