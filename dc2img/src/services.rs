use crate::api::discord::{DiscordApi, DiscordClient};
use crate::download::{DownloadOutcome, HttpDownloader, ImageDownloader};
use crate::extract::extract_images;
use crate::history::HistoryWalker;
use crate::models::*;
use crate::progress::{ProgressObserver, ProgressWindow};
use indicatif::MultiProgress;
use crate::settings::RunConfig;

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    pub output_dir: PathBuf,
    pub limit: usize,
    /// Pause after every download attempt.
    pub pause: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    ChannelNotFound,
    Completed(RunSummary),
}

/// Walks one channel and saves the target author's images. `run` consumes
/// the harvester so a workflow cannot be started twice.
pub struct ImageHarvester<'a, A: DiscordApi + ?Sized, D: ImageDownloader + ?Sized> {
    api: &'a A,
    downloader: &'a D,
    config: HarvestConfig,
}

impl<'a, A, D> ImageHarvester<'a, A, D>
where
    A: DiscordApi + Sync + ?Sized,
    D: ImageDownloader + Sync + ?Sized,
{
    pub fn new(api: &'a A, downloader: &'a D, config: HarvestConfig) -> Self {
        Self {
            api,
            downloader,
            config,
        }
    }

    pub async fn run(self, observer: &mut dyn ProgressObserver) -> Result<HarvestOutcome> {
        let channel = match self.api.get_channel(self.config.channel_id).await {
            Ok(channel) => channel,
            Err(e) => {
                error!("Failed to find channel {}: {:#}", self.config.channel_id, e);
                return Ok(HarvestOutcome::ChannelNotFound);
            }
        };
        info!(
            "Found channel: {}",
            channel.name.as_deref().unwrap_or("<unnamed>")
        );

        let mut walker = HistoryWalker::new(
            self.api,
            channel.id,
            self.config.author_id,
            self.config.limit,
        );
        let mut summary = RunSummary::default();
        let mut reported = 0;

        loop {
            let message = match walker.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    error!("Stopped reading channel history: {:#}", e);
                    summary.history_interrupted = true;
                    break;
                }
            };

            info!("Processing message from {}", message.author);
            summary.messages_matched += 1;

            for candidate in extract_images(&message, &self.config.output_dir) {
                if self.fetch(&candidate).await {
                    summary.images_saved += 1;
                } else {
                    summary.images_failed += 1;
                }
                tokio::time::sleep(self.config.pause).await;
            }

            reported = walker.scanned();
            observer.on_message_processed(reported);
        }

        summary.messages_scanned = walker.scanned();
        if reported != summary.messages_scanned {
            observer.on_message_processed(summary.messages_scanned);
        }
        observer.on_finished(&summary);

        Ok(HarvestOutcome::Completed(summary))
    }

    /// Returns whether the image ended up on disk. Failures are logged only.
    async fn fetch(&self, candidate: &ImageCandidate) -> bool {
        match candidate.source {
            ImageSource::Attachment => info!("Downloading image: {}", candidate.url),
            ImageSource::Embed => info!("Downloading embed image: {}", candidate.url),
        }

        match self
            .downloader
            .download(&candidate.url, &candidate.destination)
            .await
        {
            Ok(DownloadOutcome::Saved { path, bytes }) => {
                info!("Image saved as {} ({} bytes)", path.display(), bytes);
                true
            }
            Ok(DownloadOutcome::Rejected(status)) => {
                warn!(
                    "Failed to download {}, status code {}",
                    candidate.url,
                    status.as_u16()
                );
                false
            }
            Err(e) => {
                error!("Error downloading {}: {:#}", candidate.url, e);
                false
            }
        }
    }
}

/// Lines printed once the display is gone.
pub fn format_summary(summary: &RunSummary, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.history_interrupted {
        lines.push("Stopped early: a history page could not be fetched".to_string());
    }
    lines.push(format!(
        "Scanned {} messages, {} from the target user",
        summary.messages_scanned, summary.messages_matched
    ));
    lines.push(format!(
        "Saved {} images to {} ({} failed)",
        summary.images_saved,
        output_dir.display(),
        summary.images_failed
    ));
    lines
}

pub async fn run(config: RunConfig, progress: &MultiProgress) -> Result<HarvestOutcome> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let discord = DiscordClient::new(&config.api_url, &config.token)?;
    let me = discord
        .current_user()
        .await
        .context("Failed to log in to Discord")?;
    println!("Logged in as {}", me);

    let downloader = HttpDownloader::new()?;
    let harvester = ImageHarvester::new(
        &discord,
        &downloader,
        HarvestConfig {
            channel_id: config.channel_id,
            author_id: config.user_id,
            output_dir: config.output_dir.clone(),
            limit: config.limit,
            pause: config.delay,
        },
    );

    let mut window = ProgressWindow::open(progress);
    let outcome = harvester.run(&mut window).await?;

    match outcome {
        HarvestOutcome::ChannelNotFound => {
            window.close_after(Duration::ZERO).await;
            println!("Failed to find channel.");
        }
        HarvestOutcome::Completed(summary) => {
            window.close_after(config.close_delay).await;
            for line in format_summary(&summary, &config.output_dir) {
                println!("{}", line);
            }
        }
    }

    Ok(outcome)
}
