use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf, bytes: u64 },
    /// The server answered with a non-success status; nothing was written.
    Rejected(StatusCode),
}

#[async_trait]
pub trait ImageDownloader {
    /// Fetch `url` into `destination`. `Err` means a transport or I/O fault.
    async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }

    async fn write_body(response: reqwest::Response, destination: &Path) -> Result<u64> {
        let file = File::create(destination)
            .await
            .with_context(|| format!("Failed to create {}", destination.display()))?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(written)
    }
}

#[async_trait]
impl ImageDownloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(DownloadOutcome::Rejected(status));
        }

        match Self::write_body(response, destination).await {
            Ok(bytes) => Ok(DownloadOutcome::Saved {
                path: destination.to_path_buf(),
                bytes,
            }),
            Err(e) => {
                let _ = tokio::fs::remove_file(destination).await;
                Err(e)
            }
        }
    }
}
