//! Checkout: note → location → order placement and admin fan-out.

use crate::bot::callback::CallbackAction;
use crate::bot::handlers::admin::decision_keyboard;
use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Button, Outgoing, Reaction, ReplyKeyboard, Target};
use crate::bot::state::ConversationState;
use crate::db::{carts, orders};
use crate::db::orders::{Checkout, OrderDetails};
use crate::domain::{Coordinates, DomainEvent, OrderError};
use crate::{AppState, StorefrontError};

pub async fn begin(ctx: Ctx<'_>) -> HandlerResult {
    let customer = ctx.customer().await?;
    let cart = carts::load(&ctx.app.db, customer.id, ctx.currency()).await?;
    if cart.is_empty() {
        return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::CART_EMPTY)));
    }
    let skip = vec![vec![Button::new("⏭ Skip", CallbackAction::SkipNote)]];
    Ok(Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, messages::ASK_NOTE, ReplyKeyboard::Inline(skip)))
        .then(ConversationState::AwaitingNote))
}

/// Stores the note (or its absence) and asks for the delivery location.
pub async fn note(ctx: Ctx<'_>, note: Option<String>) -> HandlerResult {
    let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    Ok(Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, messages::ASK_LOCATION, ReplyKeyboard::RequestLocation))
        .then(ConversationState::AwaitingLocation { note }))
}

pub async fn submit(ctx: Ctx<'_>, note: Option<String>, latitude: f64, longitude: f64, address: Option<String>) -> HandlerResult {
    let location = Coordinates::new(latitude, longitude)?;
    let customer = ctx.customer().await?;
    let checkout = Checkout { note, location, address };

    let details = match orders::place(&ctx.app.db, customer.id, ctx.currency(), checkout).await {
        Ok(details) => details,
        Err(StorefrontError::Order(OrderError::NoItems)) => return Ok(abort(ctx, messages::CART_EMPTY.to_string())),
        Err(StorefrontError::Order(OrderError::OutOfStock { product, available, .. })) => {
            return Ok(abort(ctx, messages::stock_short(&product, available)));
        }
        Err(StorefrontError::Order(OrderError::Unavailable { product })) => return Ok(abort(ctx, messages::withdrawn(&product))),
        Err(e) => return Err(e),
    };

    ctx.app.events.publish(DomainEvent::OrderPlaced {
        order_id: details.order.id,
        user_id: customer.id,
        total: details.order.total,
        currency: ctx.currency().to_string(),
        items: details.items.len(),
    }).await;

    let mut reaction = Reaction::reply(Outgoing::with_keyboard(
        ctx.chat_id,
        messages::order_sent(&details.order, ctx.currency()),
        ReplyKeyboard::Remove,
    ));
    reaction.outgoing.extend(admin_alerts(ctx.app, &details, location));
    Ok(reaction.then(ConversationState::Browsing))
}

fn abort(ctx: Ctx<'_>, text: String) -> Reaction {
    Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, text, ReplyKeyboard::Remove)).then(ConversationState::Browsing)
}

/// One decision card plus the delivery pin for every configured admin.
fn admin_alerts(app: &AppState, details: &OrderDetails, location: Coordinates) -> Vec<Outgoing> {
    let text = messages::new_order_alert(details, app.currency());
    let id = details.order.id;
    if app.config.admin_ids.is_empty() {
        tracing::warn!(order_id = id, "no admins configured, order notification dropped");
    }
    app.config.admin_ids.iter().flat_map(|&admin| {
        [
            Outgoing::with_keyboard(admin, text.clone(), ReplyKeyboard::Inline(decision_keyboard(id))),
            Outgoing::Location { to: Target::Chat(admin), coordinates: location },
        ]
    }).collect()
}

pub fn cancel(ctx: Ctx<'_>, state: &ConversationState) -> Reaction {
    let text = if state.is_checking_out() { messages::CHECKOUT_CANCELLED } else { messages::UNKNOWN_INPUT };
    Reaction::reply(Outgoing::with_keyboard(ctx.chat_id, text, ReplyKeyboard::Remove)).then(ConversationState::Browsing)
}
