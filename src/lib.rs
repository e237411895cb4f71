//! Storefront Bot
//!
//! A Telegram storefront: customers browse a catalog, fill a cart and place
//! orders with a delivery location; administrators confirm or reject them
//! from their own chats.
//!
//! ## Features
//! - Category → subcategory → product → variant catalog
//! - Per-user cart with stock-checked quantities
//! - Checkout with note, location, stock decrement and admin fan-out
//! - Admin confirm/reject with customer notification and stock restoration
//! - REST admin API for catalog and order management

use std::sync::Arc;
use thiserror::Error;

pub mod api;
pub mod bot;
pub mod config;
pub mod db;
pub mod domain;
pub mod publisher;

pub use config::Config;
pub use publisher::EventPublisher;

use domain::aggregates::{OrderError, ProductError};
use domain::value_objects::{LocationError, PhoneError};

/// Shared handles for bot handlers and HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Arc<Config>,
    pub events: EventPublisher,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: Config, events: EventPublisher) -> Self {
        Self { db, config: Arc::new(config), events }
    }

    pub fn currency(&self) -> &str { &self.config.currency }
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("user is not registered")]
    NotRegistered,

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Phone(#[from] PhoneError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("invalid callback data: {0:?}")]
    InvalidCallback(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

impl StorefrontError {
    pub fn not_found(entity: &'static str, id: i64) -> Self { Self::NotFound { entity, id } }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
