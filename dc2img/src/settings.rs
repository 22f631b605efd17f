use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use config::{Config, File};
use log::debug;
use serde::Deserialize;

use crate::cli::Args;
use crate::models::Snowflake;

pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_OUTPUT_DIR: &str = "images";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub channel_id: Option<u64>,
    pub user_id: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

/// Everything the download workflow needs, validated.
#[derive(Clone)]
pub struct RunConfig {
    pub token: String,
    pub api_url: String,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub output_dir: PathBuf,
    pub limit: usize,
    pub delay: Duration,
    pub close_delay: Duration,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("channel_id", &self.channel_id)
            .field("user_id", &self.user_id)
            .field("output_dir", &self.output_dir)
            .field("limit", &self.limit)
            .field("delay", &self.delay)
            .field("close_delay", &self.close_delay)
            .finish()
    }
}

const CONFIG_FILE_NAME: &str = env!("CARGO_PKG_NAME");

// Function to get the XDG_CONFIG_HOME path
fn get_xdg_config_path() -> Option<PathBuf> {
    // First check XDG_CONFIG_HOME environment variable
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config));
    }

    // If XDG_CONFIG_HOME is not set, fall back to $HOME/.config
    if let Ok(home) = env::var("HOME") {
        return Some(PathBuf::from(home).join(".config"));
    }

    None
}

pub fn load_settings() -> anyhow::Result<Settings> {
    match get_xdg_config_path() {
        Some(xdg_config) => {
            load_settings_from(&xdg_config.join(CONFIG_FILE_NAME).join("config.toml"))
        }
        None => Ok(Settings::default()),
    }
}

pub fn load_settings_from(config_path: &std::path::Path) -> anyhow::Result<Settings> {
    if !config_path.exists() {
        return Ok(Settings::default());
    }

    Config::builder()
        .add_source(File::from(config_path.to_path_buf()).required(false))
        .build()?
        .try_deserialize()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to deserialize config file {}: {}",
                config_path.display(),
                e
            )
        })
}

/// Fill whatever the command line and environment left unset from `settings`.
pub fn merge_settings_with_args(args: &Args, settings: Settings) -> Args {
    let mut new_args = args.clone();

    macro_rules! apply_if_missing {
        ($args:expr, $field:ident, $config:expr) => {
            if $args.$field.is_none() {
                $args.$field = $config.$field;
            }
        };
    }

    apply_if_missing!(new_args, token, settings);
    apply_if_missing!(new_args, api_url, settings);
    apply_if_missing!(new_args, channel_id, settings);
    apply_if_missing!(new_args, user_id, settings);
    apply_if_missing!(new_args, output_dir, settings);

    debug!(
        "merged config: channel {:?}, user {:?}, output {:?}",
        new_args.channel_id, new_args.user_id, new_args.output_dir
    );

    new_args
}

impl TryFrom<Args> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> anyhow::Result<Self> {
        let token = args
            .token
            .filter(|token| !token.trim().is_empty())
            .context("DISCORD_TOKEN is not set; pass --token or add it to the config file")?;
        let channel_id = args
            .channel_id
            .context("No channel configured; pass --channel-id")?;
        let user_id = args.user_id.context("No user configured; pass --user-id")?;

        Ok(RunConfig {
            token,
            api_url: args.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            channel_id: Snowflake(channel_id),
            user_id: Snowflake(user_id),
            output_dir: args
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            limit: args.limit,
            delay: Duration::from_millis(args.delay_ms),
            close_delay: Duration::from_millis(args.close_delay_ms),
        })
    }
}
