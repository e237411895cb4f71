//! Orders: placement from a cart, admin transitions and reporting.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteExecutor, SqlitePool};
use crate::db::{carts, found};
use crate::domain::{AdminAction, Coordinates, Customer, Order, OrderDraft, OrderError, OrderItem, OrderStatus, Restock};
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub customer: Customer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub customers: i64,
    pub total_orders: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub delivered: i64,
    /// Sum of confirmed and delivered order totals, minor units.
    pub revenue: i64,
}

/// Delivery details captured during checkout.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub note: Option<String>,
    pub location: Coordinates,
    pub address: Option<String>,
}

/// Turns the user's cart into a pending order.
///
/// Runs in one transaction: the cart is read, every line's stock is decremented
/// (failing if any line is oversold), order and items are inserted, and the cart
/// is emptied. Nothing is written when any step fails.
pub async fn place(db: &SqlitePool, user_id: i64, currency: &str, checkout: Checkout) -> Result<OrderDetails> {
    let mut tx = db.begin().await?;
    let cart = carts::load_with(&mut *tx, user_id, currency).await?;
    let draft = OrderDraft::from_cart(&cart, checkout.note, checkout.location, checkout.address)?;
    let now = Utc::now();

    let order = sqlx::query_as::<_, Order>("INSERT INTO orders (user_id, total, status, note, latitude, longitude, address, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
        .bind(draft.user_id).bind(draft.total.minor_units()).bind(OrderStatus::Pending).bind(&draft.note)
        .bind(draft.location.latitude()).bind(draft.location.longitude()).bind(&draft.address).bind(now).bind(now)
        .fetch_one(&mut *tx).await?;

    for item in &draft.items {
        let quantity = i64::from(item.quantity);
        let decremented = sqlx::query("UPDATE product_variants SET stock = stock - ? WHERE id = ? AND stock >= ?")
            .bind(quantity).bind(item.variant_id).bind(quantity)
            .execute(&mut *tx).await?;
        if decremented.rows_affected() == 0 {
            let available: Option<(i64,)> = sqlx::query_as("SELECT stock FROM product_variants WHERE id = ?")
                .bind(item.variant_id).fetch_optional(&mut *tx).await?;
            return Err(OrderError::OutOfStock {
                product: format!("{} ({})", item.product_name, item.variant_name),
                requested: item.quantity,
                available: available.map_or(0, |(s,)| u32::try_from(s).unwrap_or(0)),
            }.into());
        }
        sqlx::query("INSERT INTO order_items (order_id, variant_id, product_name, variant_name, quantity, unit_price) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(order.id).bind(item.variant_id).bind(&item.product_name).bind(&item.variant_name)
            .bind(quantity).bind(item.unit_price.minor_units())
            .execute(&mut *tx).await?;
    }

    carts::clear_with(&mut *tx, user_id).await?;
    tx.commit().await?;
    tracing::info!(order_id = order.id, user_id, total = order.total, items = draft.items.len(), "order placed");
    get(db, order.id).await
}

async fn fetch_order<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Order> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?").bind(id).fetch_optional(executor).await?;
    found(row, "order", id)
}

async fn fetch_items<'e, E: SqliteExecutor<'e>>(executor: E, order_id: i64) -> Result<Vec<OrderItem>> {
    Ok(sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
        .bind(order_id).fetch_all(executor).await?)
}

pub async fn get(db: &SqlitePool, id: i64) -> Result<OrderDetails> {
    let order = fetch_order(db, id).await?;
    let items = fetch_items(db, id).await?;
    let customer = crate::db::users::get(db, order.user_id).await?;
    Ok(OrderDetails { order, items, customer })
}

pub async fn list_pending(db: &SqlitePool) -> Result<Vec<Order>> {
    Ok(sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE status = ? ORDER BY created_at, id")
        .bind(OrderStatus::Pending).fetch_all(db).await?)
}

pub async fn list_for_user(db: &SqlitePool, user_id: i64) -> Result<Vec<Order>> {
    Ok(sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC")
        .bind(user_id).fetch_all(db).await?)
}

/// One page of orders, newest first, with the total count for the filter.
pub async fn list(db: &SqlitePool, status: Option<OrderStatus>, page: u32, per_page: u32) -> Result<(Vec<Order>, i64)> {
    let page = page.max(1);
    let offset = i64::from(page - 1).saturating_mul(i64::from(per_page));
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3")
        .bind(status).bind(i64::from(per_page)).bind(offset)
        .fetch_all(db).await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE (?1 IS NULL OR status = ?1)")
        .bind(status).fetch_one(db).await?;
    Ok((orders, total.0))
}

/// Confirms or rejects a pending order. Rejection puts every item back in stock.
pub async fn apply_admin_action(db: &SqlitePool, id: i64, action: AdminAction, admin_id: i64) -> Result<(OrderDetails, Vec<Restock>)> {
    let mut tx = db.begin().await?;
    let order = fetch_order(&mut *tx, id).await?;
    let next = order.status.apply(action)?;
    let now = Utc::now();
    let confirmed_at = (next == OrderStatus::Confirmed).then_some(now);

    let updated = sqlx::query("UPDATE orders SET status = ?, updated_at = ?, confirmed_at = COALESCE(?, confirmed_at) WHERE id = ? AND status = ?")
        .bind(next).bind(now).bind(confirmed_at).bind(id).bind(order.status)
        .execute(&mut *tx).await?;
    if updated.rows_affected() == 0 {
        return Err(OrderError::InvalidTransition { from: order.status, to: next }.into());
    }

    let mut restocked = vec![];
    if next == OrderStatus::Cancelled {
        for item in fetch_items(&mut *tx, id).await? {
            sqlx::query("UPDATE product_variants SET stock = stock + ? WHERE id = ?")
                .bind(item.quantity).bind(item.variant_id).execute(&mut *tx).await?;
            restocked.push(Restock { variant_id: item.variant_id, quantity: item.quantity });
        }
    }
    tx.commit().await?;
    tracing::info!(order_id = id, admin_id, from = %order.status, to = %next, restocked = restocked.len(), "order status changed");
    Ok((get(db, id).await?, restocked))
}

pub async fn mark_delivered(db: &SqlitePool, id: i64) -> Result<Order> {
    let order = fetch_order(db, id).await?;
    let next = order.status.deliver()?;
    let updated = sqlx::query_as::<_, Order>("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *")
        .bind(next).bind(Utc::now()).bind(id).bind(order.status)
        .fetch_optional(db).await?;
    let order = updated.ok_or(OrderError::InvalidTransition { from: order.status, to: next })?;
    tracing::info!(order_id = id, "order delivered");
    Ok(order)
}

pub async fn stats(db: &SqlitePool) -> Result<OrderStats> {
    let rows: Vec<(OrderStatus, i64, i64)> = sqlx::query_as("SELECT status, COUNT(*), COALESCE(SUM(total), 0) FROM orders GROUP BY status")
        .fetch_all(db).await?;
    let mut stats = OrderStats { customers: crate::db::users::count(db).await?, ..Default::default() };
    for (status, count, sum) in rows {
        stats.total_orders += count;
        match status {
            OrderStatus::Pending => stats.pending = count,
            OrderStatus::Confirmed => { stats.confirmed = count; stats.revenue += sum; }
            OrderStatus::Cancelled => stats.cancelled = count,
            OrderStatus::Delivered => { stats.delivered = count; stats.revenue += sum; }
        }
    }
    Ok(stats)
}
