//! SQLite persistence: pool setup, migrations and per-aggregate repositories.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use crate::Result;

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod seed;
pub mod users;

/// Opens the store database on a single-connection pool.
///
/// SQLite has one writer, and a deferred transaction upgrading to a write on a
/// second connection fails with `SQLITE_BUSY` without waiting. Transactions
/// queue on the pool instead.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    // WAL lets outside readers (backups, sqlite3 shells) work next to the bot.
    let options = if url.contains(":memory:") { options } else { options.journal_mode(SqliteJournalMode::Wal) };
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Fresh migrated in-memory database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = connect("sqlite::memory:").await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Maps a missing row to `NotFound`.
pub(crate) fn found<T>(row: Option<T>, entity: &'static str, id: i64) -> Result<T> {
    row.ok_or(crate::StorefrontError::not_found(entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::{self, tests::{category, product, variant}};
    use crate::domain::{PhoneNumber, Profile};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_database_serializes_concurrent_writers() {
        let path = std::env::temp_dir().join(format!("storefront-{}.db", uuid::Uuid::now_v7()));
        let db = connect(&format!("sqlite://{}", path.display())).await.unwrap();
        migrate(&db).await.unwrap();
        let cat = catalog::create_category(&db, &category("Food")).await.unwrap();
        let p = catalog::create_product(&db, &product(cat.id, "Tea")).await.unwrap();
        let tea = catalog::create_variant(&db, &variant(p.id, "Green", 300, 100_000)).await.unwrap().id;

        let mut tasks = vec![];
        for telegram_id in 1..=5 {
            let user = users::register(&db, &Profile::new(telegram_id, "Ann"), &PhoneNumber::parse("+12345678901").unwrap()).await.unwrap();
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..40 {
                    carts::add_item(&db, user.id, tea, 1).await?;
                }
                crate::Result::Ok(user.id)
            }));
        }
        for task in tasks {
            let user = task.await.unwrap().unwrap();
            assert_eq!(carts::load(&db, user, "USD").await.unwrap().quantity_of(tea), 40);
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
