//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{Coordinates, Money};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Confirmed, Cancelled, Delivered }

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [Self::Pending, Self::Confirmed, Self::Cancelled, Self::Delivered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Delivered => "delivered",
        }
    }

    pub fn confirm(self) -> Result<Self, OrderError> { self.transition(Self::Pending, Self::Confirmed) }
    pub fn cancel(self) -> Result<Self, OrderError> { self.transition(Self::Pending, Self::Cancelled) }
    pub fn deliver(self) -> Result<Self, OrderError> { self.transition(Self::Confirmed, Self::Delivered) }

    pub fn apply(self, action: AdminAction) -> Result<Self, OrderError> {
        match action {
            AdminAction::Confirm => self.confirm(),
            AdminAction::Reject => self.cancel(),
        }
    }

    fn transition(self, from: Self, to: Self) -> Result<Self, OrderError> {
        if self != from { return Err(OrderError::InvalidTransition { from: self, to }); }
        Ok(to)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Decision an administrator takes on a pending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction { Confirm, Reject }

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn total(&self, currency: &str) -> Money { Money::from_minor(self.total, currency) }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub product_name: String,
    pub variant_name: String,
    pub quantity: i64,
    pub unit_price: i64,
}

impl OrderItem {
    pub fn line_total(&self, currency: &str) -> Money {
        Money::from_minor(self.unit_price, currency).multiply(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Snapshot of a cart line taken at order creation.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub variant_id: i64,
    pub product_name: String,
    pub variant_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

/// An order ready to be persisted: line snapshots plus the computed total.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub user_id: i64,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub note: Option<String>,
    pub location: Coordinates,
    pub address: Option<String>,
}

impl OrderDraft {
    pub fn from_cart(cart: &Cart, note: Option<String>, location: Coordinates, address: Option<String>) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::NoItems); }
        if let Some(line) = cart.items().iter().find(|l| !l.available) {
            return Err(OrderError::Unavailable { product: format!("{} ({})", line.product_name, line.variant_name) });
        }
        if let Some(line) = cart.items().iter().find(|l| l.exceeds_stock()) {
            return Err(OrderError::OutOfStock {
                product: format!("{} ({})", line.product_name, line.variant_name),
                requested: line.quantity.value(),
                available: line.stock.value(),
            });
        }
        let items: Vec<LineItem> = cart.items().iter().map(|l| LineItem {
            variant_id: l.variant_id,
            product_name: l.product_name.clone(),
            variant_name: l.variant_name.clone(),
            quantity: l.quantity.value(),
            unit_price: l.unit_price.clone(),
        }).collect();
        let total = items.iter().fold(Money::zero(cart.currency()), |acc, i| acc.add(&i.total()).unwrap_or(acc));
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Ok(Self { user_id: cart.user_id(), items, total, note, location, address })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("not enough stock for {product}: requested {requested}, available {available}")]
    OutOfStock { product: String, requested: u32, available: u32 },
    #[error("{product} is no longer sold")]
    Unavailable { product: String },
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
