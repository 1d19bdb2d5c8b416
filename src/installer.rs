//! Install stage: hand the downloaded package to the platform
//!
//! A directly executable package (the snapshot installer jar) is marked
//! executable and launched; archive packages get their containing folder
//! revealed for manual extraction. Either way the running process cannot
//! safely continue afterwards - the orchestrator exits once this returns.

use crate::error::UpdateError;
use crate::process::ProcessControl;
use log::info;
use std::path::Path;

/// Install the downloaded package via the platform opener.
pub fn install_package(path: &Path, process: &dyn ProcessControl) -> Result<(), UpdateError> {
    if !path.exists() {
        return Err(UpdateError::InstallFailed(format!(
            "package not found: {}",
            path.display()
        )));
    }

    if is_directly_executable(path) {
        mark_executable(path)?;
        info!("Launching installer: {}", path.display());
        process.open_file(path)
    } else {
        info!(
            "Opening folder for manual extraction: {}",
            path.display()
        );
        process.open_containing_folder(path)
    }
}

/// Only the installer jar can be launched directly; everything else is an
/// archive the user extracts by hand.
fn is_directly_executable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("jar"))
        .unwrap_or(false)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), UpdateError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), UpdateError> {
    Ok(())
}
