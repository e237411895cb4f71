//! Admin commands and order decisions.

use crate::bot::callback::CallbackAction;
use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Button, Keyboard, Origin, Outgoing, Reaction, ReplyKeyboard, Target};
use crate::db::orders;
use crate::domain::{AdminAction, Coordinates, DomainEvent, OrderError, OrderStatus};
use crate::StorefrontError;

pub(crate) fn decision_keyboard(order_id: i64) -> Keyboard {
    vec![vec![
        Button::new("✅ Confirm", CallbackAction::AdminConfirm(order_id)),
        Button::new("❌ Reject", CallbackAction::AdminReject(order_id)),
    ]]
}

pub async fn panel(ctx: Ctx<'_>) -> HandlerResult {
    ctx.ensure_admin()?;
    let stats = orders::stats(&ctx.app.db).await?;
    Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::admin_panel(&stats))))
}

pub async fn stats(ctx: Ctx<'_>) -> HandlerResult {
    ctx.ensure_admin()?;
    let stats = orders::stats(&ctx.app.db).await?;
    Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::stats_text(&stats, ctx.currency()))))
}

/// Re-sends every pending order with its decision buttons.
pub async fn pending(ctx: Ctx<'_>) -> HandlerResult {
    ctx.ensure_admin()?;
    let pending = orders::list_pending(&ctx.app.db).await?;
    if pending.is_empty() {
        return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::NO_PENDING)));
    }
    let mut reaction = Reaction::new();
    for order in pending {
        let details = orders::get(&ctx.app.db, order.id).await?;
        let text = messages::order_summary(&details, ctx.currency());
        reaction = reaction.push(Outgoing::with_keyboard(ctx.chat_id, text, ReplyKeyboard::Inline(decision_keyboard(order.id))));
    }
    Ok(reaction)
}

/// Confirms or rejects a pending order from its notification card.
///
/// The customer is told the outcome, the card loses its buttons and gets a
/// stamp naming the deciding admin, and confirmed orders are forwarded to the
/// configured channel.
pub async fn decide(ctx: Ctx<'_>, callback_id: &str, origin: Option<&Origin>, order_id: i64, action: AdminAction) -> HandlerResult {
    ctx.ensure_admin()?;
    let admin_id = ctx.sender.telegram_id;
    let (details, restocked) = match orders::apply_admin_action(&ctx.app.db, order_id, action, admin_id).await {
        Ok(done) => done,
        Err(StorefrontError::Order(OrderError::InvalidTransition { from, .. })) => {
            let text = messages::already_decided(order_id, from);
            return Ok(Reaction::reply(Outgoing::answer(callback_id, Some(text), true)));
        }
        Err(e) => return Err(e),
    };
    let status = details.order.status;

    let event = match status {
        OrderStatus::Confirmed => DomainEvent::OrderConfirmed { order_id, admin_id },
        _ => DomainEvent::OrderCancelled { order_id, admin_id, restocked },
    };
    ctx.app.events.publish(event).await;

    let customer_text = match status {
        OrderStatus::Confirmed => messages::order_confirmed(order_id),
        _ => messages::order_rejected(order_id),
    };
    let mut reaction = Reaction::reply(Outgoing::Send {
        to: Target::Chat(details.customer.telegram_id),
        text: customer_text,
        keyboard: ReplyKeyboard::None,
    });

    if let Some(origin) = origin {
        let card = origin.text.clone().unwrap_or_else(|| messages::new_order_alert(&details, ctx.currency()));
        let stamp = messages::decision_stamp(status, &ctx.sender.first_name);
        reaction = reaction.push(Outgoing::Edit {
            chat_id: origin.chat_id,
            message_id: origin.message_id,
            text: format!("{card}\n\n{stamp}"),
            keyboard: vec![],
        });
    }
    reaction = reaction.push(Outgoing::answer(callback_id, Some(format!("Order #{order_id} {status}")), false));

    if status == OrderStatus::Confirmed {
        if let Some(channel) = &ctx.app.config.channel_id {
            let to = Target::parse(channel);
            reaction = reaction.push(Outgoing::Send {
                to: to.clone(),
                text: messages::order_summary(&details, ctx.currency()),
                keyboard: ReplyKeyboard::None,
            });
            if let Ok(coordinates) = Coordinates::new(details.order.latitude, details.order.longitude) {
                reaction = reaction.push(Outgoing::Location { to, coordinates });
            }
        }
    }
    Ok(reaction)
}
