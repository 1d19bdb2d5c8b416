//! Error types for the update subsystem

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("No update channel could be resolved")]
    ChannelUnresolved,

    #[error("Update cancelled by the user")]
    UserCancelled,

    #[error("Network unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("Remote returned an error: {0}")]
    RemoteUnavailable(String),

    #[error("Malformed update metadata: {0}")]
    MetadataMalformed(String),

    #[error("Release has no downloadable asset")]
    NoDownloadAsset,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Install failed: {0}")]
    InstallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
