//! Streaming downloads into the archive cache.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::USER_AGENT;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream `url` into `dest`. The partial file is removed on failure so the
/// cache never holds a truncated archive.
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<(), DownloadError> {
    match stream_to_file(client, url, dest).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tokio::fs::remove_file(dest).await.ok();
            Err(e)
        }
    }
}

async fn stream_to_file(client: &Client, url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(())
}
