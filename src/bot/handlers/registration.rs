//! `/start` and phone number capture.

use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Outgoing, Reaction, ReplyKeyboard};
use crate::bot::state::ConversationState;
use crate::db::users;
use crate::domain::PhoneNumber;
use crate::StorefrontError;

pub async fn start(ctx: Ctx<'_>) -> HandlerResult {
    match ctx.customer().await {
        Ok(_) => Ok(Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, messages::WELCOME_BACK, ReplyKeyboard::Remove))
            .then(ConversationState::Browsing)),
        Err(StorefrontError::NotRegistered) => {
            Ok(Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, messages::WELCOME, ReplyKeyboard::RequestContact))
                .then(ConversationState::AwaitingPhone))
        }
        Err(e) => Err(e),
    }
}

/// Phone typed by hand.
pub async fn phone_text(ctx: Ctx<'_>, text: &str) -> HandlerResult {
    register(ctx, text).await
}

/// Phone shared through the contact button. Only the sender's own contact is accepted.
pub async fn contact(ctx: Ctx<'_>, phone: &str, owner: Option<i64>) -> HandlerResult {
    if owner.is_some_and(|id| id != ctx.sender.telegram_id) {
        return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::FOREIGN_CONTACT)));
    }
    register(ctx, phone).await
}

async fn register(ctx: Ctx<'_>, raw: &str) -> HandlerResult {
    let phone = match PhoneNumber::parse(raw) {
        Ok(phone) => phone,
        Err(_) => return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::INVALID_PHONE))),
    };
    users::register(&ctx.app.db, ctx.sender, &phone).await?;
    Ok(Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, messages::PHONE_REGISTERED, ReplyKeyboard::Remove))
        .then(ConversationState::Browsing))
}
