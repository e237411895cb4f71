use crate::bot::callback::CallbackAction;
use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Button, Keyboard, Origin, Outgoing, Reaction};
use crate::db::carts;
use crate::domain::{Cart, ProductError};
use crate::StorefrontError;

fn cart_keyboard(cart: &Cart) -> Keyboard {
    let mut keyboard: Keyboard = cart.items().iter()
        .map(|line| vec![Button::new(format!("❌ Remove {} - {}", line.product_name, line.variant_name), CallbackAction::Remove(line.variant_id))])
        .collect();
    keyboard.push(vec![
        Button::new("✅ Checkout", CallbackAction::Checkout),
        Button::new("🗑 Clear cart", CallbackAction::ClearCart),
    ]);
    keyboard.push(vec![Button::new("🛍 Continue shopping", CallbackAction::BackToCategories)]);
    keyboard
}

pub async fn show(ctx: Ctx<'_>, origin: Option<&Origin>) -> HandlerResult {
    let customer = ctx.customer().await?;
    let cart = carts::load(&ctx.app.db, customer.id, ctx.currency()).await?;
    let keyboard = if cart.is_empty() {
        vec![vec![Button::new("🛍 Start shopping", CallbackAction::BackToCategories)]]
    } else {
        cart_keyboard(&cart)
    };
    Ok(Reaction::reply(Outgoing::show(ctx.chat_id, origin, messages::cart_text(&cart), keyboard)))
}

/// Adds one unit and answers the button press with the new line quantity.
pub async fn add(ctx: Ctx<'_>, callback_id: &str, variant_id: i64) -> HandlerResult {
    let customer = ctx.customer().await?;
    let answer = match carts::add_item(&ctx.app.db, customer.id, variant_id, 1).await {
        Ok(quantity) => Outgoing::answer(callback_id, Some(messages::added_to_cart(quantity)), false),
        Err(StorefrontError::Product(ProductError::InsufficientStock { .. } | ProductError::InvalidQuantity)) => {
            Outgoing::answer(callback_id, Some(messages::OUT_OF_STOCK.into()), true)
        }
        Err(StorefrontError::Product(ProductError::Inactive)) => {
            Outgoing::answer(callback_id, Some(messages::NOT_AVAILABLE.into()), true)
        }
        Err(e) => return Err(e),
    };
    Ok(Reaction::reply(answer))
}

pub async fn remove(ctx: Ctx<'_>, origin: Option<&Origin>, variant_id: i64) -> HandlerResult {
    let customer = ctx.customer().await?;
    carts::remove_item(&ctx.app.db, customer.id, variant_id).await?;
    show(ctx, origin).await
}

pub async fn clear(ctx: Ctx<'_>, origin: Option<&Origin>) -> HandlerResult {
    let customer = ctx.customer().await?;
    carts::clear(&ctx.app.db, customer.id).await?;
    let keyboard = vec![vec![Button::new("🛍 Start shopping", CallbackAction::BackToCategories)]];
    Ok(Reaction::reply(Outgoing::show(ctx.chat_id, origin, messages::CART_CLEARED, keyboard)))
}
