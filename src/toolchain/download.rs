//! HTTP download of source archives and installers.
//!
//! The body is streamed chunk by chunk into `<name>.part` and renamed once
//! complete, so an interrupted transfer never looks like a present archive.

use crate::error::BuildError;
use crate::models::DownloadProgress;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Percentage for a block-based progress report, rounded to two decimals.
///
/// `block_num * block_size / total_size * 100`; `None` when the total is unknown.
pub fn progress_percentage(block_num: u64, block_size: u64, total_size: i64) -> Option<f64> {
    if total_size <= 0 {
        return None;
    }
    let pct = (block_num as f64 * block_size as f64) / total_size as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// Console line for a progress value, meant to be printed without a newline.
pub fn render_progress(percentage: f64) -> String {
    format!("\rDownloading: {:?}%", percentage)
}

/// Staging path used while a download is in flight.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Streaming HTTP downloader.
#[derive(Clone, Default)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Downloader {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Downloader { client }
    }

    /// Fetch `url` into `dest_dir/filename`, reporting progress after every chunk.
    pub async fn download_to(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: &str,
        on_progress: &(dyn Fn(DownloadProgress) + Send + Sync),
    ) -> Result<PathBuf, BuildError> {
        let dest = dest_dir.join(filename);
        let staging = part_path(&dest);
        log::info!("[Download] {} -> {}", url, dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BuildError::DownloadFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::DownloadFailed(format!(
                "{}: HTTP {}",
                url, status
            )));
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(&staging).await?;
        let mut received: u64 = 0;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&staging).await;
                    return Err(BuildError::DownloadFailed(format!(
                        "{}: transfer interrupted: {}",
                        url, e
                    )));
                }
            };

            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            on_progress(DownloadProgress { received, total });
        }

        file.flush().await?;
        drop(file);

        if let Some(expected) = total {
            if received != expected {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(BuildError::DownloadFailed(format!(
                    "{}: received {} of {} bytes",
                    url, received, expected
                )));
            }
        }

        tokio::fs::rename(&staging, &dest).await?;
        log::debug!("[Download] Wrote {} bytes to {}", received, dest.display());
        Ok(dest)
    }

    /// Download `url` to `dest` unless it already exists.
    ///
    /// Returns `true` when a download took place.
    pub async fn ensure_archive(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &(dyn Fn(DownloadProgress) + Send + Sync),
    ) -> Result<bool, BuildError> {
        if dest.is_file() {
            log::info!("[Download] {} already present, skipping", dest.display());
            return Ok(false);
        }

        let dir = dest.parent().ok_or_else(|| {
            BuildError::DownloadFailed(format!("No parent directory for {}", dest.display()))
        })?;
        let filename = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BuildError::DownloadFailed(format!("No file name in {}", dest.display()))
            })?;

        self.download_to(url, dir, &filename, on_progress).await?;
        Ok(true)
    }
}
