use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start the bot and register your phone number")]
    Start,
    #[command(description = "browse the catalog")]
    Order,
    #[command(description = "show your cart")]
    Cart,
    #[command(description = "show your recent orders")]
    Orders,
    #[command(description = "show this help")]
    Help,
    #[command(description = "abort the current checkout")]
    Cancel,
    #[command(description = "skip the order note")]
    Skip,
    #[command(description = "admin panel")]
    Admin,
    #[command(description = "store statistics")]
    Stats,
    #[command(description = "orders waiting for a decision")]
    Pending,
}

impl Command {
    pub fn is_admin_only(&self) -> bool { matches!(self, Self::Admin | Self::Stats | Self::Pending) }

    /// Parses `/command` or `/command@bot_name`; anything else is `None`.
    /// Trailing arguments, such as a `/start` deep-link payload, are ignored.
    pub fn from_text(text: &str, bot_name: &str) -> Option<Self> {
        if !text.starts_with('/') { return None; }
        let head = text.split_whitespace().next()?;
        Self::parse(head, bot_name).ok()
    }
}

/// Command menu shown to customers; admin commands stay unlisted.
pub fn customer_commands() -> Vec<BotCommand> {
    const HIDDEN: [&str; 3] = ["admin", "stats", "pending"];
    Command::bot_commands()
        .into_iter()
        .filter(|c| !HIDDEN.contains(&c.command.trim_start_matches('/')))
        .collect()
}
