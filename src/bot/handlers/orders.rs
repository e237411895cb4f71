use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Outgoing, Reaction};
use crate::db::orders;

const HISTORY_LIMIT: usize = 10;

/// `/orders`: the customer's latest orders, newest first.
pub async fn history(ctx: Ctx<'_>) -> HandlerResult {
    let customer = ctx.customer().await?;
    let orders = orders::list_for_user(&ctx.app.db, customer.id).await?;
    if orders.is_empty() {
        return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::NO_ORDERS)));
    }

    let mut text = messages::orders_header(orders.len());
    text.push_str("\n\n");
    for order in orders.iter().take(HISTORY_LIMIT) {
        text.push_str(&messages::order_line(order, ctx.currency()));
        text.push('\n');
    }
    if orders.len() > HISTORY_LIMIT {
        text.push('\n');
        text.push_str(&messages::more_orders(orders.len() - HISTORY_LIMIT));
    }
    Ok(Reaction::reply(Outgoing::text(ctx.chat_id, text.trim_end())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::handlers::tests::{app, register, stocked, CUSTOMER};
    use crate::db::carts;
    use crate::db::orders::Checkout;
    use crate::domain::{Coordinates, Profile};

    #[tokio::test]
    async fn test_history_is_capped() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let ctx = Ctx::new(&app, &sender, CUSTOMER);
        assert_eq!(history(ctx).await.unwrap().outgoing, vec![Outgoing::text(CUSTOMER, messages::NO_ORDERS)]);

        let variant = stocked(&app, 50).await;
        let customer = ctx.customer().await.unwrap();
        for _ in 0..12 {
            carts::add_item(&app.db, customer.id, variant, 1).await.unwrap();
            let checkout = Checkout { note: None, location: Coordinates::new(1.0, 2.0).unwrap(), address: None };
            orders::place(&app.db, customer.id, "USD", checkout).await.unwrap();
        }

        let reaction = history(ctx).await.unwrap();
        let Outgoing::Send { text, .. } = &reaction.outgoing[0] else { panic!("expected a message") };
        assert!(text.starts_with("📦 Your Orders (12)"));
        assert_eq!(text.matches("⏳ #").count(), 10);
        assert!(text.ends_with("... and 2 more orders"));
    }
}
