use std::{fmt, path::PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Channel to read the history of
    #[arg(long, env = "DC2IMG_CHANNEL_ID")]
    pub channel_id: Option<u64>,

    /// Only download images posted by this user
    #[arg(long, env = "DC2IMG_USER_ID")]
    pub user_id: Option<u64>,

    /// Directory to save images to [default: images]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of history messages to read
    #[arg(long, default_value_t = 35000)]
    pub limit: usize,

    /// Pause after each download, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// How long the finished progress display stays up, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub close_delay_ms: u64,

    /// Discord REST API base URL [default: https://discord.com/api/v10]
    #[arg(long, env = "DISCORD_API_URL")]
    pub api_url: Option<String>,

    /// Log verbosity
    #[arg(short, long, value_name = "LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}
