//! Routes one inbound update through the conversation state machine.

use crate::bot::callback::CallbackAction;
use crate::bot::commands::Command;
use crate::bot::handlers::{admin, cart, catalog, checkout, orders, registration, Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Origin, Outgoing, Reaction};
use crate::bot::state::ConversationState;
use crate::domain::{AdminAction, OrderError, Profile, ProductError};
use crate::{AppState, StorefrontError};

/// An update reduced to what the conversation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Inbound {
    pub sender: Profile,
    pub chat_id: i64,
    pub kind: Incoming,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Incoming {
    Command(Command),
    Text(String),
    Contact { phone: String, user_id: Option<i64> },
    /// Plain location pin or a venue; venues carry an address.
    Location { latitude: f64, longitude: f64, address: Option<String> },
    Callback { id: String, origin: Option<Origin>, data: String },
}

/// Handles the update and never fails: errors become a reply to the sender.
/// Callback queries always get exactly one answer.
pub async fn handle(app: &AppState, inbound: Inbound, state: ConversationState) -> Reaction {
    let ctx = Ctx::new(app, &inbound.sender, inbound.chat_id);
    let callback_id = match &inbound.kind {
        Incoming::Callback { id, .. } => Some(id.clone()),
        _ => None,
    };

    let result = dispatch(ctx, &state, inbound.kind.clone()).await;
    let mut reaction = match result {
        Ok(reaction) => reaction,
        Err(e) => failure(&inbound, callback_id.as_deref(), e),
    };
    if let Some(id) = callback_id {
        if !reaction.outgoing.iter().any(Outgoing::is_answer) {
            reaction.outgoing.push(Outgoing::answer(id, None, false));
        }
    }
    reaction
}

async fn dispatch(ctx: Ctx<'_>, state: &ConversationState, incoming: Incoming) -> HandlerResult {
    match incoming {
        Incoming::Command(command) => on_command(ctx, state, command).await,
        Incoming::Text(text) => match state {
            ConversationState::Start => registration::start(ctx).await,
            ConversationState::AwaitingPhone => registration::phone_text(ctx, &text).await,
            ConversationState::AwaitingNote => checkout::note(ctx, Some(text)).await,
            ConversationState::AwaitingLocation { .. } => Ok(reply(ctx, messages::LOCATION_EXPECTED)),
            ConversationState::Browsing => Ok(reply(ctx, messages::UNKNOWN_INPUT)),
        },
        Incoming::Contact { phone, user_id } => match state {
            ConversationState::Start | ConversationState::AwaitingPhone => registration::contact(ctx, &phone, user_id).await,
            _ => Ok(reply(ctx, messages::UNKNOWN_INPUT)),
        },
        Incoming::Location { latitude, longitude, address } => match state {
            ConversationState::AwaitingLocation { note } => checkout::submit(ctx, note.clone(), latitude, longitude, address).await,
            _ => Ok(reply(ctx, messages::UNKNOWN_INPUT)),
        },
        Incoming::Callback { id, origin, data } => {
            let action: CallbackAction = data.parse()?;
            on_callback(ctx, state, &id, origin.as_ref(), action).await
        }
    }
}

async fn on_command(ctx: Ctx<'_>, state: &ConversationState, command: Command) -> HandlerResult {
    if command.is_admin_only() {
        ctx.ensure_admin()?;
    }
    let reaction = match command {
        Command::Start => return registration::start(ctx).await,
        Command::Help => return Ok(reply(ctx, &messages::help(ctx.is_admin()))),
        Command::Cancel => return Ok(checkout::cancel(ctx, state)),
        Command::Skip if *state == ConversationState::AwaitingNote => return checkout::note(ctx, None).await,
        Command::Skip => return Ok(reply(ctx, messages::NOTHING_TO_SKIP)),
        Command::Order => catalog::categories(ctx, None).await?,
        Command::Cart => cart::show(ctx, None).await?,
        Command::Orders => orders::history(ctx).await?,
        Command::Admin => admin::panel(ctx).await?,
        Command::Stats => admin::stats(ctx).await?,
        Command::Pending => admin::pending(ctx).await?,
    };
    // Any other command leaves an unfinished checkout.
    Ok(if state.is_checking_out() && reaction.next.is_none() { reaction.then(ConversationState::Browsing) } else { reaction })
}

async fn on_callback(ctx: Ctx<'_>, state: &ConversationState, id: &str, origin: Option<&Origin>, action: CallbackAction) -> HandlerResult {
    match action {
        CallbackAction::Category(c) => catalog::category(ctx, origin, c).await,
        CallbackAction::Subcategory(s) => catalog::subcategory(ctx, origin, s).await,
        CallbackAction::Product(p) => catalog::product(ctx, origin, p).await,
        CallbackAction::Variant(v) => catalog::variant(ctx, origin, v).await,
        CallbackAction::BackToCategories => catalog::categories(ctx, origin).await,
        CallbackAction::AddToCart(v) => cart::add(ctx, id, v).await,
        CallbackAction::Remove(v) => cart::remove(ctx, origin, v).await,
        CallbackAction::ViewCart => cart::show(ctx, origin).await,
        CallbackAction::ClearCart => cart::clear(ctx, origin).await,
        CallbackAction::Checkout => checkout::begin(ctx).await,
        CallbackAction::SkipNote if *state == ConversationState::AwaitingNote => checkout::note(ctx, None).await,
        CallbackAction::SkipNote => Ok(Reaction::reply(Outgoing::answer(id, Some(messages::NOTHING_TO_SKIP.into()), false))),
        CallbackAction::AdminConfirm(o) => admin::decide(ctx, id, origin, o, AdminAction::Confirm).await,
        CallbackAction::AdminReject(o) => admin::decide(ctx, id, origin, o, AdminAction::Reject).await,
    }
}

fn reply(ctx: Ctx<'_>, text: &str) -> Reaction { Reaction::reply(Outgoing::text(ctx.chat_id, text)) }

/// What the sender is told when a handler fails. `None` means the failure is ours.
fn user_message(error: &StorefrontError) -> Option<String> {
    let text = match error {
        StorefrontError::NotRegistered => messages::NOT_REGISTERED.to_string(),
        StorefrontError::Unauthorized => messages::UNAUTHORIZED.to_string(),
        StorefrontError::NotFound { .. } | StorefrontError::Product(ProductError::Inactive) => messages::NOT_AVAILABLE.to_string(),
        StorefrontError::Product(_) => messages::OUT_OF_STOCK.to_string(),
        StorefrontError::Order(OrderError::NoItems) => messages::CART_EMPTY.to_string(),
        StorefrontError::Order(OrderError::OutOfStock { product, available, .. }) => messages::stock_short(product, *available),
        StorefrontError::Order(OrderError::Unavailable { product }) => messages::withdrawn(product),
        StorefrontError::Order(OrderError::InvalidTransition { from, .. }) => format!("This order is already {from}."),
        StorefrontError::Phone(_) => messages::INVALID_PHONE.to_string(),
        StorefrontError::Location(_) => messages::LOCATION_EXPECTED.to_string(),
        StorefrontError::InvalidCallback(_) => messages::NOT_AVAILABLE.to_string(),
        _ => return None,
    };
    Some(text)
}

fn failure(inbound: &Inbound, callback_id: Option<&str>, error: StorefrontError) -> Reaction {
    let text = match user_message(&error) {
        Some(text) => {
            tracing::debug!(telegram_id = inbound.sender.telegram_id, error = %error, "request refused");
            text
        }
        None => {
            tracing::error!(telegram_id = inbound.sender.telegram_id, chat_id = inbound.chat_id, error = %error, "handler failed");
            messages::GENERIC_ERROR.to_string()
        }
    };
    match callback_id {
        Some(id) => Reaction::reply(Outgoing::answer(id, Some(text), true)),
        None => Reaction::reply(Outgoing::text(inbound.chat_id, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::handlers::tests::{app, register, stocked, ADMIN, CUSTOMER};

    fn inbound(telegram_id: i64, kind: Incoming) -> Inbound {
        Inbound { sender: Profile::new(telegram_id, "Ann"), chat_id: telegram_id, kind }
    }

    fn callback(data: &str) -> Incoming {
        Incoming::Callback { id: "q1".into(), origin: None, data: data.into() }
    }

    #[tokio::test]
    async fn test_callbacks_are_always_answered() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        stocked(&app, 1).await;

        let browsed = handle(&app, inbound(CUSTOMER, callback("back_to_categories")), ConversationState::Browsing).await;
        assert_eq!(browsed.outgoing.iter().filter(|o| o.is_answer()).count(), 1);

        let garbage = handle(&app, inbound(CUSTOMER, callback("category_abc")), ConversationState::Browsing).await;
        assert_eq!(garbage.outgoing, vec![Outgoing::answer("q1", Some(messages::NOT_AVAILABLE.into()), true)]);

        let missing = handle(&app, inbound(CUSTOMER, callback("product_999")), ConversationState::Browsing).await;
        assert_eq!(missing.outgoing, vec![Outgoing::answer("q1", Some(messages::NOT_AVAILABLE.into()), true)]);
    }

    #[tokio::test]
    async fn test_admin_commands_refused_for_customers() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        for command in [Command::Admin, Command::Stats, Command::Pending] {
            let reaction = handle(&app, inbound(CUSTOMER, Incoming::Command(command)), ConversationState::Browsing).await;
            assert_eq!(reaction.outgoing, vec![Outgoing::text(CUSTOMER, messages::UNAUTHORIZED)]);
        }
        let ok = handle(&app, inbound(ADMIN, Incoming::Command(Command::Stats)), ConversationState::Start).await;
        assert!(matches!(&ok.outgoing[0], Outgoing::Send { text, .. } if text.starts_with("📊")));
    }

    #[tokio::test]
    async fn test_unregistered_user_is_sent_to_start() {
        let app = app().await;
        let reaction = handle(&app, inbound(CUSTOMER, Incoming::Command(Command::Cart)), ConversationState::Start).await;
        assert_eq!(reaction.outgoing, vec![Outgoing::text(CUSTOMER, messages::NOT_REGISTERED)]);
        assert_eq!(reaction.next, None);
    }

    #[tokio::test]
    async fn test_location_outside_checkout_is_ignored() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let kind = Incoming::Location { latitude: 1.0, longitude: 2.0, address: None };
        let reaction = handle(&app, inbound(CUSTOMER, kind), ConversationState::Browsing).await;
        assert_eq!(reaction.outgoing, vec![Outgoing::text(CUSTOMER, messages::UNKNOWN_INPUT)]);
    }

    #[tokio::test]
    async fn test_other_command_leaves_checkout() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let state = ConversationState::AwaitingLocation { note: None };
        let reaction = handle(&app, inbound(CUSTOMER, Incoming::Command(Command::Orders)), state).await;
        assert_eq!(reaction.next, Some(ConversationState::Browsing));
    }
}
