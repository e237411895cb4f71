//! Cart Aggregate

use serde::Serialize;
use sqlx::FromRow;
use crate::domain::value_objects::{Money, Quantity};

/// Cart line joined with its variant and product, as read from storage.
#[derive(Clone, Debug, FromRow)]
pub struct CartLineRow {
    pub variant_id: i64,
    pub product_name: String,
    pub variant_name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub stock: i64,
    /// Both the variant and its product are still sold.
    pub available: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub variant_id: i64,
    pub product_name: String,
    pub variant_name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub stock: Quantity,
    pub available: bool,
}

impl CartLine {
    pub fn from_row(row: CartLineRow, currency: &str) -> Self {
        Self {
            variant_id: row.variant_id,
            product_name: row.product_name,
            variant_name: row.variant_name,
            unit_price: Money::from_minor(row.unit_price, currency),
            quantity: Quantity::from_column(row.quantity),
            stock: Quantity::from_column(row.stock),
            available: row.available,
        }
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity.value()) }
    pub fn exceeds_stock(&self) -> bool { self.quantity > self.stock }
}

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    user_id: i64,
    currency: String,
    items: Vec<CartLine>,
}

impl Cart {
    pub fn new(user_id: i64, currency: &str) -> Self {
        Self { user_id, currency: currency.to_string(), items: vec![] }
    }

    pub fn with_lines(user_id: i64, currency: &str, lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new(user_id, currency);
        for line in lines { cart.add_line(line); }
        cart
    }

    pub fn user_id(&self) -> i64 { self.user_id }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[CartLine] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity.value()).sum() }

    pub fn quantity_of(&self, variant_id: i64) -> u32 {
        self.items.iter().find(|i| i.variant_id == variant_id).map_or(0, |i| i.quantity.value())
    }

    /// Adds a line, merging quantities when the variant is already present.
    pub fn add_line(&mut self, line: CartLine) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.variant_id == line.variant_id) {
            existing.quantity = existing.quantity.add(line.quantity.value());
        } else {
            self.items.push(line);
        }
    }

    pub fn total(&self) -> Money {
        self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_total()).unwrap_or(acc))
    }
}
