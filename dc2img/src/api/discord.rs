use crate::models::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Largest page the message history endpoint will return.
pub const MAX_PAGE_SIZE: usize = 100;

#[async_trait]
pub trait DiscordApi {
    /// The account the token belongs to. Succeeding here is our "ready" signal.
    async fn current_user(&self) -> Result<DiscordUser>;
    async fn get_channel(&self, channel_id: Snowflake) -> Result<DiscordChannel>;
    /// One page of history, newest first, strictly older than `before` when given.
    async fn get_messages(
        &self,
        channel_id: Snowflake,
        before: Option<Snowflake>,
        limit: usize,
    ) -> Result<Vec<DiscordMessage>>;
}

pub struct DiscordClient {
    client: Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bot {}", token))
                .context("Discord token contains invalid header characters")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "cannot get {} with status {}: {}",
                what,
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to decode {}", what))
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn current_user(&self) -> Result<DiscordUser> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::parse(response, "current user").await
    }

    async fn get_channel(&self, channel_id: Snowflake) -> Result<DiscordChannel> {
        let url = format!("{}/channels/{}", self.base_url, channel_id);
        let response = self.client.get(&url).send().await?;
        Self::parse(response, "channel").await
    }

    async fn get_messages(
        &self,
        channel_id: Snowflake,
        before: Option<Snowflake>,
        limit: usize,
    ) -> Result<Vec<DiscordMessage>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let mut query = vec![("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        Self::parse(response, "channel messages").await
    }
}
