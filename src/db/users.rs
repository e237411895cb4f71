use chrono::Utc;
use sqlx::SqlitePool;
use crate::db::found;
use crate::domain::{Customer, PhoneNumber, Profile};
use crate::Result;

pub async fn find_by_telegram_id(db: &SqlitePool, telegram_id: i64) -> Result<Option<Customer>> {
    Ok(sqlx::query_as::<_, Customer>("SELECT * FROM users WHERE telegram_id = ?")
        .bind(telegram_id).fetch_optional(db).await?)
}

pub async fn get(db: &SqlitePool, id: i64) -> Result<Customer> {
    let row = sqlx::query_as::<_, Customer>("SELECT * FROM users WHERE id = ?").bind(id).fetch_optional(db).await?;
    found(row, "user", id)
}

/// Registers the sender, or refreshes phone and names if they already exist.
pub async fn register(db: &SqlitePool, profile: &Profile, phone: &PhoneNumber) -> Result<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO users (telegram_id, phone_number, first_name, last_name, username, created_at) VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT (telegram_id) DO UPDATE SET phone_number = excluded.phone_number, first_name = excluded.first_name, \
         last_name = excluded.last_name, username = excluded.username RETURNING *")
        .bind(profile.telegram_id).bind(phone.as_str()).bind(&profile.first_name).bind(&profile.last_name)
        .bind(&profile.username).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(user_id = customer.id, telegram_id = customer.telegram_id, "customer registered");
    Ok(customer)
}

pub async fn count(db: &SqlitePool) -> Result<i64> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(db).await?;
    Ok(total.0)
}
