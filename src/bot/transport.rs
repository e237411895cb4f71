//! Telegram glue: turns updates into [`Inbound`] values and delivers [`Outgoing`] ones.

use teloxide::dispatching::dialogue::Dialogue;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::{ApiError, RequestError};
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    Me, MessageId, Recipient, ReplyMarkup, User,
};
use crate::bot::commands::{customer_commands, Command};
use crate::bot::outgoing::{Keyboard, Origin, Outgoing, ReplyKeyboard, Target};
use crate::bot::router::{self, Inbound, Incoming};
use crate::bot::state::ConversationState;
use crate::bot::DialogueStorage;
use crate::domain::Profile;
use crate::AppState;

pub type StoreDialogue = Dialogue<ConversationState, DialogueStorage>;
pub type HandlerResult = anyhow::Result<()>;

/// Long-polls Telegram until the task is dropped.
pub async fn run(bot: Bot, app: AppState) -> anyhow::Result<()> {
    let me = bot.get_me().await?;
    if let Err(e) = bot.set_my_commands(customer_commands()).await {
        tracing::warn!(error = %e, "could not register the command menu");
    }
    tracing::info!(username = %me.username(), admins = app.config.admin_ids.len(), "bot started");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![DialogueStorage::new(), app, me])
        .default_handler(|update| async move { tracing::trace!(?update, "unhandled update") })
        .error_handler(LoggingErrorHandler::with_custom_text("error in bot dispatcher"))
        .build()
        .dispatch()
        .await;
    Ok(())
}

fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, DialogueStorage, ConversationState>()
                .endpoint(on_message),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, DialogueStorage, ConversationState>()
                .endpoint(on_callback),
        )
}

fn profile(user: &User) -> Profile {
    Profile {
        telegram_id: ChatId::from(user.id).0,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}

fn incoming(msg: &Message, me: &Me) -> Option<Incoming> {
    if let Some(text) = msg.text() {
        return Some(match Command::from_text(text, me.username()) {
            Some(command) => Incoming::Command(command),
            None => Incoming::Text(text.to_string()),
        });
    }
    if let Some(contact) = msg.contact() {
        return Some(Incoming::Contact {
            phone: contact.phone_number.clone(),
            user_id: contact.user_id.map(|id| ChatId::from(id).0),
        });
    }
    if let Some(venue) = msg.venue() {
        return Some(Incoming::Location {
            latitude: venue.location.latitude,
            longitude: venue.location.longitude,
            address: Some(format!("{}, {}", venue.title, venue.address)),
        });
    }
    msg.location().map(|l| Incoming::Location { latitude: l.latitude, longitude: l.longitude, address: None })
}

async fn on_message(bot: Bot, dialogue: StoreDialogue, state: ConversationState, msg: Message, app: AppState, me: Me) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else { return Ok(()) };
    let Some(kind) = incoming(&msg, &me) else {
        tracing::debug!(chat_id = msg.chat.id.0, "ignoring unsupported message");
        return Ok(());
    };
    let inbound = Inbound { sender: profile(user), chat_id: msg.chat.id.0, kind };
    let reaction = router::handle(&app, inbound, state).await;
    if let Some(next) = reaction.next {
        dialogue.update(next).await?;
    }
    deliver(&bot, reaction.outgoing).await;
    Ok(())
}

async fn on_callback(bot: Bot, dialogue: StoreDialogue, state: ConversationState, q: CallbackQuery, app: AppState) -> HandlerResult {
    let origin = q.message.as_ref().map(|m| Origin {
        chat_id: m.chat().id.0,
        message_id: m.id().0,
        text: m.regular_message().and_then(|r| r.text().or(r.caption())).map(str::to_string),
    });
    let chat_id = origin.as_ref().map_or(ChatId::from(q.from.id).0, |o| o.chat_id);
    let kind = Incoming::Callback { id: q.id.to_string(), origin, data: q.data.clone().unwrap_or_default() };
    let inbound = Inbound { sender: profile(&q.from), chat_id, kind };

    let reaction = router::handle(&app, inbound, state).await;
    if let Some(next) = reaction.next {
        dialogue.update(next).await?;
    }
    deliver(&bot, reaction.outgoing).await;
    Ok(())
}

fn inline(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        keyboard.iter().map(|row| row.iter().map(|b| InlineKeyboardButton::callback(b.text.clone(), b.action.encode()))),
    )
}

fn reply_markup(keyboard: &ReplyKeyboard) -> Option<ReplyMarkup> {
    match keyboard {
        ReplyKeyboard::None => None,
        ReplyKeyboard::Inline(k) => Some(inline(k).into()),
        ReplyKeyboard::RequestContact => {
            let button = KeyboardButton::new("📱 Share phone number").request(ButtonRequest::Contact);
            Some(KeyboardMarkup::new([[button]]).resize_keyboard().one_time_keyboard().into())
        }
        ReplyKeyboard::RequestLocation => {
            let button = KeyboardButton::new("📍 Share location").request(ButtonRequest::Location);
            Some(KeyboardMarkup::new([[button]]).resize_keyboard().one_time_keyboard().into())
        }
        ReplyKeyboard::Remove => Some(KeyboardRemove::new().into()),
    }
}

fn recipient(target: &Target) -> Recipient {
    match target {
        Target::Chat(id) => Recipient::Id(ChatId(*id)),
        Target::Channel(username) => Recipient::ChannelUsername(username.clone()),
    }
}

async fn send(bot: &Bot, to: &Target, text: String, keyboard: &ReplyKeyboard) -> Result<(), RequestError> {
    let mut request = bot.send_message(recipient(to), text);
    if let Some(markup) = reply_markup(keyboard) {
        request = request.reply_markup(markup);
    }
    request.await.map(drop)
}

/// Sends everything in order. A failed delivery is logged and does not stop the rest,
/// so one blocked admin never hides an order from the others.
pub async fn deliver(bot: &Bot, outgoing: Vec<Outgoing>) {
    for item in outgoing {
        let result = match &item {
            Outgoing::Send { to, text, keyboard } => send(bot, to, text.clone(), keyboard).await,
            Outgoing::Edit { chat_id, message_id, text, keyboard } => {
                let mut request = bot.edit_message_text(ChatId(*chat_id), MessageId(*message_id), text.clone());
                if !keyboard.is_empty() {
                    request = request.reply_markup(inline(keyboard));
                }
                match request.await {
                    Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
                    // Photo cards have no text to edit; answer with a fresh message instead.
                    Err(e) => {
                        tracing::debug!(chat_id, message_id, error = %e, "edit failed, sending a new message");
                        let keyboard = if keyboard.is_empty() { ReplyKeyboard::None } else { ReplyKeyboard::Inline(keyboard.clone()) };
                        send(bot, &Target::Chat(*chat_id), text.clone(), &keyboard).await
                    }
                }
            }
            Outgoing::Photo { to, file_id, caption, keyboard } => {
                bot.send_photo(recipient(to), InputFile::file_id(file_id.clone()))
                    .caption(caption.clone())
                    .reply_markup(inline(keyboard))
                    .await
                    .map(drop)
            }
            Outgoing::Location { to, coordinates } => {
                bot.send_location(recipient(to), coordinates.latitude(), coordinates.longitude()).await.map(drop)
            }
            Outgoing::Answer { callback_id, text, alert } => {
                let mut request = bot.answer_callback_query(callback_id.clone()).show_alert(*alert);
                if let Some(text) = text {
                    request = request.text(text.clone());
                }
                request.await.map(drop)
            }
        };
        if let Err(e) = result {
            tracing::warn!(target_chat = ?item.target(), error = %e, "failed to deliver telegram message");
        }
    }
}
