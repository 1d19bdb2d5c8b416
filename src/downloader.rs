//! Package downloader - streams the update package to local storage

use crate::error::UpdateError;
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const UPDATE_HTTP_USER_AGENT: &str = "Runehall-Updater";

/// Generous timeout; update packages are large
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Download service interface: fetch `url` into `destination_dir/filename`
/// and return the local path.
#[async_trait]
pub trait PackageDownloader: Send + Sync {
    async fn download(
        &self,
        url: &str,
        destination_dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, UpdateError>;
}

/// Default downloader: streaming HTTP transfer with size verification
pub struct HttpPackageDownloader {
    client: reqwest::Client,
}

impl HttpPackageDownloader {
    pub fn new() -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(UPDATE_HTTP_USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PackageDownloader for HttpPackageDownloader {
    async fn download(
        &self,
        url: &str,
        destination_dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, UpdateError> {
        tokio::fs::create_dir_all(destination_dir)
            .await
            .map_err(|e| UpdateError::DownloadFailed(format!("creating destination dir: {e}")))?;

        let dest_path = destination_dir.join(filename);
        info!("Downloading update to: {}", dest_path.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::DownloadFailed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpdateError::DownloadFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        debug!("Download size: {} bytes", total_size);

        let mut file = File::create(&dest_path)
            .await
            .map_err(|e| UpdateError::DownloadFailed(format!("creating file: {e}")))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(e) => {
                    // no partial file is treated as valid
                    drop(file);
                    let _ = tokio::fs::remove_file(&dest_path).await;
                    return Err(UpdateError::DownloadFailed(format!("reading chunk: {e}")));
                }
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| UpdateError::DownloadFailed(format!("writing file: {e}")))?;

            downloaded += chunk.len() as u64;
            debug!("Downloaded {}/{} bytes", downloaded, total_size);
        }

        file.flush()
            .await
            .map_err(|e| UpdateError::DownloadFailed(format!("flushing file: {e}")))?;

        if total_size > 0 && downloaded != total_size {
            error!(
                "Downloaded size mismatch: expected {}, got {}",
                total_size, downloaded
            );
            let _ = tokio::fs::remove_file(&dest_path).await;
            return Err(UpdateError::DownloadFailed(format!(
                "incomplete transfer: expected {total_size} bytes, got {downloaded}"
            )));
        }

        if downloaded == 0 {
            let _ = tokio::fs::remove_file(&dest_path).await;
            return Err(UpdateError::DownloadFailed("empty package".to_string()));
        }

        info!("Download complete: {} bytes", downloaded);
        Ok(dest_path)
    }
}

/// Derive the local filename for a package URL: the URL's basename with
/// `-upgrade` inserted before the (last-dot) extension, so a fresh download
/// never collides with a previously downloaded copy.
pub fn upgrade_filename(package_url: &str) -> String {
    let filename = package_url.rsplit('/').next().unwrap_or(package_url);
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-upgrade{}", &filename[..dot], &filename[dot..]),
        _ => format!("{filename}-upgrade"),
    }
}

/// Where update packages land: the user's download directory
pub fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_filename_inserts_before_extension() {
        assert_eq!(
            upgrade_filename("https://x/app-2.1.0.zip"),
            "app-2.1.0-upgrade.zip"
        );
        assert_eq!(
            upgrade_filename("https://host/runehall-installer-2026.03.14.jar"),
            "runehall-installer-2026.03.14-upgrade.jar"
        );
    }

    #[test]
    fn test_upgrade_filename_splits_at_last_dot() {
        assert_eq!(
            upgrade_filename("https://x/runehall-desktop-2.0.9.tar.bz2"),
            "runehall-desktop-2.0.9.tar-upgrade.bz2"
        );
    }

    #[test]
    fn test_upgrade_filename_without_extension() {
        assert_eq!(upgrade_filename("https://x/package"), "package-upgrade");
    }

    #[test]
    fn test_default_download_dir_exists() {
        // dirs may not resolve in a bare CI environment, but when it does the
        // path must end in a plausible download location
        if let Some(dir) = default_download_dir() {
            assert!(!dir.as_os_str().is_empty());
        }
    }
}
