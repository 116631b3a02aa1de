/// Streaming file downloads with atomic temp-file moves
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Downloads a URL to a destination path on disk
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and write it to `destination`, replacing any existing file.
    /// The caller owns the overwrite policy; this always writes.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        (**self).fetch(url, destination).await
    }
}

/// HTTP fetcher streaming response bodies straight to disk
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        debug!("Downloading '{}' to '{}'", url, destination.display());

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error {}: {}", response.status(), url));
        }

        // Stream into a temp file next to the destination so the final move
        // stays on one filesystem and is atomic.
        let dir = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            // Filter out keep-alive new chunks
            if chunk.is_empty() {
                continue;
            }
            temp.write_all(&chunk)?;
        }
        temp.flush()?;

        // Overwrite if exists
        temp.persist(destination)?;

        Ok(())
    }
}
