/// Where a chat stands in the ordering conversation.
///
/// Stored per chat in teloxide's dialogue storage. The flow is linear:
/// `AwaitingPhone → Browsing → AwaitingNote → AwaitingLocation → Browsing`,
/// and `/cancel` drops back to `Browsing` from anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Start,
    AwaitingPhone,
    Browsing,
    AwaitingNote,
    AwaitingLocation { note: Option<String> },
}

impl ConversationState {
    pub fn is_checking_out(&self) -> bool {
        matches!(self, Self::AwaitingNote | Self::AwaitingLocation { .. })
    }
}
