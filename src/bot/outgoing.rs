//! Transport-free replies produced by the handlers.

use crate::bot::callback::CallbackAction;
use crate::bot::state::ConversationState;
use crate::domain::Coordinates;

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub text: String,
    pub action: CallbackAction,
}

impl Button {
    pub fn new(text: impl Into<String>, action: CallbackAction) -> Self { Self { text: text.into(), action } }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ReplyKeyboard {
    #[default]
    None,
    Inline(Keyboard),
    RequestContact,
    RequestLocation,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Chat(i64),
    /// `@channel` username.
    Channel(String),
}

impl Target {
    /// Reads a configured chat reference: numeric ids or `@username`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => Self::Chat(id),
            Err(_) => Self::Channel(raw.trim().to_string()),
        }
    }
}

/// Message the originating callback was attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outgoing {
    Send { to: Target, text: String, keyboard: ReplyKeyboard },
    Edit { chat_id: i64, message_id: i32, text: String, keyboard: Keyboard },
    Photo { to: Target, file_id: String, caption: String, keyboard: Keyboard },
    Location { to: Target, coordinates: Coordinates },
    Answer { callback_id: String, text: Option<String>, alert: bool },
}

impl Outgoing {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Send { to: Target::Chat(chat_id), text: text.into(), keyboard: ReplyKeyboard::None }
    }

    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: ReplyKeyboard) -> Self {
        Self::Send { to: Target::Chat(chat_id), text: text.into(), keyboard }
    }

    /// Replaces the origin message when there is one, otherwise sends a new message.
    pub fn show(chat_id: i64, origin: Option<&Origin>, text: impl Into<String>, keyboard: Keyboard) -> Self {
        match origin {
            Some(o) => Self::Edit { chat_id: o.chat_id, message_id: o.message_id, text: text.into(), keyboard },
            None => Self::with_keyboard(chat_id, text, ReplyKeyboard::Inline(keyboard)),
        }
    }

    pub fn answer(callback_id: impl Into<String>, text: Option<String>, alert: bool) -> Self {
        Self::Answer { callback_id: callback_id.into(), text, alert }
    }

    pub fn is_answer(&self) -> bool { matches!(self, Self::Answer { .. }) }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::Send { to, .. } | Self::Photo { to, .. } | Self::Location { to, .. } => Some(to),
            Self::Edit { .. } | Self::Answer { .. } => None,
        }
    }
}

/// What a handler wants done: messages to deliver and an optional state change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reaction {
    pub next: Option<ConversationState>,
    pub outgoing: Vec<Outgoing>,
}

impl Reaction {
    pub fn new() -> Self { Self::default() }

    pub fn reply(outgoing: Outgoing) -> Self { Self { next: None, outgoing: vec![outgoing] } }

    pub fn push(mut self, outgoing: Outgoing) -> Self {
        self.outgoing.push(outgoing);
        self
    }

    pub fn then(mut self, state: ConversationState) -> Self {
        self.next = Some(state);
        self
    }
}
