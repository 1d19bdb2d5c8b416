//! Process control consumed by the install/restart stages

use crate::error::UpdateError;
use log::info;
use std::path::Path;

/// Narrow interface over platform open/exit facilities
pub trait ProcessControl: Send + Sync {
    /// Open a file with the platform's default handler
    fn open_file(&self, path: &Path) -> Result<(), UpdateError>;

    /// Reveal the directory containing `path`
    fn open_containing_folder(&self, path: &Path) -> Result<(), UpdateError>;

    /// Exit the running process
    fn exit_process(&self, code: i32);
}

/// Default implementation backed by the platform opener
#[derive(Debug, Default)]
pub struct SystemProcessControl;

impl ProcessControl for SystemProcessControl {
    fn open_file(&self, path: &Path) -> Result<(), UpdateError> {
        open::that(path)
            .map_err(|e| UpdateError::InstallFailed(format!("opening {}: {e}", path.display())))
    }

    fn open_containing_folder(&self, path: &Path) -> Result<(), UpdateError> {
        let parent = path.parent().ok_or_else(|| {
            UpdateError::InstallFailed(format!("{} has no containing folder", path.display()))
        })?;
        open::that(parent)
            .map_err(|e| UpdateError::InstallFailed(format!("opening {}: {e}", parent.display())))
    }

    fn exit_process(&self, code: i32) {
        info!("Exiting process with code {}", code);
        std::process::exit(code);
    }
}
