pub mod discord;

pub use discord::{
    Attachment as DiscordAttachment, Channel as DiscordChannel, Embed as DiscordEmbed,
    Message as DiscordMessage, Snowflake, User as DiscordUser,
};

use std::path::PathBuf;

/// An image found in a message, paired with the file it will be saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub source: ImageSource,
    pub url: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Attachment,
    Embed,
}

/// Totals reported once the history walk is over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages_scanned: usize,
    pub messages_matched: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    /// A history page failed, so the walk ended before the history did.
    pub history_interrupted: bool,
}
