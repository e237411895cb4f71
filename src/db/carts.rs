//! Per-user carts.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use crate::db::found;
use crate::domain::{Cart, CartLine, CartLineRow, Variant};
use crate::Result;

const CART_LINES: &str = "SELECT c.variant_id, p.name AS product_name, v.name AS variant_name, v.price AS unit_price, c.quantity, v.stock, \
    (v.is_active AND p.is_active) AS available \
    FROM cart_items c JOIN product_variants v ON v.id = c.variant_id JOIN products p ON p.id = v.product_id \
    WHERE c.user_id = ? ORDER BY c.id";

pub async fn load(db: &SqlitePool, user_id: i64, currency: &str) -> Result<Cart> {
    load_with(db, user_id, currency).await
}

pub(crate) async fn load_with<'e, E: SqliteExecutor<'e>>(executor: E, user_id: i64, currency: &str) -> Result<Cart> {
    let rows = sqlx::query_as::<_, CartLineRow>(CART_LINES).bind(user_id).fetch_all(executor).await?;
    Ok(Cart::with_lines(user_id, currency, rows.into_iter().map(|r| CartLine::from_row(r, currency))))
}

/// Adds `quantity` units of a variant, merging with an existing line.
/// Returns the resulting line quantity; the total may not exceed stock.
pub async fn add_item(db: &SqlitePool, user_id: i64, variant_id: i64, quantity: u32) -> Result<u32> {
    let mut tx = db.begin().await?;
    let variant = sqlx::query_as::<_, Variant>("SELECT * FROM product_variants WHERE id = ?")
        .bind(variant_id).fetch_optional(&mut *tx).await?;
    let variant = found(variant, "variant", variant_id)?;
    let current: Option<(i64,)> = sqlx::query_as("SELECT quantity FROM cart_items WHERE user_id = ? AND variant_id = ?")
        .bind(user_id).bind(variant_id).fetch_optional(&mut *tx).await?;
    let current = current.map_or(0, |(q,)| u32::try_from(q).unwrap_or(0));
    let wanted = current.saturating_add(quantity);
    variant.ensure_available(wanted)?;

    sqlx::query("INSERT INTO cart_items (user_id, variant_id, quantity, created_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT (user_id, variant_id) DO UPDATE SET quantity = cart_items.quantity + excluded.quantity")
        .bind(user_id).bind(variant_id).bind(i64::from(quantity)).bind(Utc::now())
        .execute(&mut *tx).await?;
    tx.commit().await?;
    tracing::debug!(user_id, variant_id, quantity = wanted, "cart line updated");
    Ok(wanted)
}

pub async fn remove_item(db: &SqlitePool, user_id: i64, variant_id: i64) -> Result<bool> {
    let done = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND variant_id = ?")
        .bind(user_id).bind(variant_id).execute(db).await?;
    Ok(done.rows_affected() > 0)
}

pub async fn clear(db: &SqlitePool, user_id: i64) -> Result<u64> {
    clear_with(db, user_id).await
}

pub(crate) async fn clear_with<'e, E: SqliteExecutor<'e>>(executor: E, user_id: i64) -> Result<u64> {
    let done = sqlx::query("DELETE FROM cart_items WHERE user_id = ?").bind(user_id).execute(executor).await?;
    Ok(done.rows_affected())
}
