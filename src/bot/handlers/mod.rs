//! Conversation handlers.
//!
//! Each handler reads and writes the database and describes its answer as a
//! [`Reaction`]; nothing in here talks to Telegram directly.

use crate::bot::outgoing::Reaction;
use crate::db::users;
use crate::domain::{Customer, Profile};
use crate::{AppState, Result, StorefrontError};

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod registration;

/// Who is talking, and where.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    pub app: &'a AppState,
    pub sender: &'a Profile,
    pub chat_id: i64,
}

impl<'a> Ctx<'a> {
    pub fn new(app: &'a AppState, sender: &'a Profile, chat_id: i64) -> Self { Self { app, sender, chat_id } }

    pub fn currency(&self) -> &str { self.app.currency() }

    pub fn is_admin(&self) -> bool { self.app.config.is_admin(self.sender.telegram_id) }

    /// The sender's customer record; `NotRegistered` until they shared a phone number.
    pub async fn customer(&self) -> Result<Customer> {
        users::find_by_telegram_id(&self.app.db, self.sender.telegram_id)
            .await?
            .ok_or(StorefrontError::NotRegistered)
    }

    pub fn ensure_admin(&self) -> Result<()> {
        if self.is_admin() { return Ok(()); }
        tracing::warn!(telegram_id = self.sender.telegram_id, "non-admin tried an admin action");
        Err(StorefrontError::Unauthorized)
    }
}

pub type HandlerResult = Result<Reaction>;
