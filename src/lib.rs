//! Runehall self-update subsystem
//!
//! Resolves which update channel applies, fetches remote version metadata for
//! it, compares that against the running build, and drives the
//! download/install/restart pipeline. Dialogs, the download transport, and
//! process facilities are consumed through narrow traits so the GUI frontends
//! can plug in their own implementations.

pub mod build_info;
pub mod channel;
pub mod checker;
pub mod compare;
pub mod downloader;
pub mod error;
pub mod installer;
pub mod metadata;
pub mod orchestrator;
pub mod process;
pub mod settings;
pub mod types;
pub mod ui;

// Re-export commonly used items
pub use build_info::{BuildInfo, VersionInfo};
pub use channel::{Channel, ChannelResolver};
pub use checker::UpdateChecker;
pub use downloader::{HttpPackageDownloader, PackageDownloader};
pub use error::UpdateError;
pub use metadata::RemoteEndpoints;
pub use orchestrator::UpdateOrchestrator;
pub use process::{ProcessControl, SystemProcessControl};
pub use settings::{load_settings, save_settings, UpdateSettings};
pub use types::{RemoteRelease, UpdateCheckResult, UpdateSession, UpdateState};
pub use ui::{DialogSurface, SilentDialog};
