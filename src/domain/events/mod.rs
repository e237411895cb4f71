//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced { order_id: i64, user_id: i64, total: i64, currency: String, items: usize },
    OrderConfirmed { order_id: i64, admin_id: i64 },
    OrderCancelled { order_id: i64, admin_id: i64, restocked: Vec<Restock> },
    OrderDelivered { order_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Restock { pub variant_id: i64, pub quantity: i64 }

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "storefront.orders.placed",
            Self::OrderConfirmed { .. } => "storefront.orders.confirmed",
            Self::OrderCancelled { .. } => "storefront.orders.cancelled",
            Self::OrderDelivered { .. } => "storefront.orders.delivered",
        }
    }

    pub fn order_id(&self) -> i64 {
        match self {
            Self::OrderPlaced { order_id, .. }
            | Self::OrderConfirmed { order_id, .. }
            | Self::OrderCancelled { order_id, .. }
            | Self::OrderDelivered { order_id } => *order_id,
        }
    }
}
