use std::collections::VecDeque;

use anyhow::Result;
use log::debug;

use crate::api::discord::{DiscordApi, MAX_PAGE_SIZE};
use crate::models::{DiscordMessage, Snowflake};

/// Walks a channel's history newest first, handing out only the messages
/// written by `author`. Pages are fetched lazily, at most `limit` messages are
/// read in total, and a finished walker stays finished.
pub struct HistoryWalker<'a, A: DiscordApi + ?Sized> {
    api: &'a A,
    channel_id: Snowflake,
    author: Snowflake,
    remaining: usize,
    before: Option<Snowflake>,
    page: VecDeque<DiscordMessage>,
    scanned: usize,
    exhausted: bool,
}

impl<'a, A: DiscordApi + ?Sized> HistoryWalker<'a, A> {
    pub fn new(api: &'a A, channel_id: Snowflake, author: Snowflake, limit: usize) -> Self {
        Self {
            api,
            channel_id,
            author,
            remaining: limit,
            before: None,
            page: VecDeque::new(),
            scanned: 0,
            exhausted: limit == 0,
        }
    }

    /// Number of history messages read so far, whoever wrote them.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Next message from the target author, or `None` once the history or the
    /// message budget runs out.
    pub async fn next_message(&mut self) -> Result<Option<DiscordMessage>> {
        loop {
            if let Some(message) = self.page.pop_front() {
                self.scanned += 1;
                if message.author.id == self.author {
                    return Ok(Some(message));
                }
                continue;
            }

            if self.exhausted {
                return Ok(None);
            }

            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let requested = self.remaining.min(MAX_PAGE_SIZE);
        let mut messages = match self
            .api
            .get_messages(self.channel_id, self.before, requested)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };
        messages.truncate(requested);

        debug!(
            "fetched {} messages before {:?} in channel {}",
            messages.len(),
            self.before,
            self.channel_id
        );

        self.remaining -= messages.len();
        if messages.len() < requested || self.remaining == 0 {
            self.exhausted = true;
        }
        self.before = messages.last().map(|m| m.id);
        self.page.extend(messages);

        Ok(())
    }
}
