//! Telegram conversation: commands, callback payloads, handlers and delivery.

use teloxide::dispatching::dialogue::InMemStorage;

pub mod callback;
pub mod commands;
pub mod handlers;
pub mod messages;
pub mod outgoing;
pub mod router;
pub mod state;
pub mod transport;

pub type DialogueStorage = InMemStorage<state::ConversationState>;

pub use callback::CallbackAction;
pub use commands::Command;
pub use outgoing::{Outgoing, Reaction};
pub use router::{handle, Inbound, Incoming};
pub use state::ConversationState;
pub use transport::run;
