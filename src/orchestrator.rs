//! Update orchestrator - drives the multi-stage update pipeline
//!
//! The orchestrator owns the pipeline state machine and the per-update
//! session. Failures during download or install are terminal for the session;
//! the user re-triggers the flow, nothing is retried automatically. The only
//! successful exit is the deliberate process exit once an install has been
//! initiated.

use crate::checker::UpdateChecker;
use crate::downloader::{default_download_dir, upgrade_filename, PackageDownloader};
use crate::error::UpdateError;
use crate::installer::install_package;
use crate::process::ProcessControl;
use crate::types::{RemoteRelease, UpdateCheckResult, UpdateSession, UpdateState};
use crate::ui::DialogSurface;
use log::{error, info};
use std::path::PathBuf;

pub struct UpdateOrchestrator {
    checker: UpdateChecker,
    downloader: Box<dyn PackageDownloader>,
    dialog: Box<dyn DialogSurface>,
    process: Box<dyn ProcessControl>,
    download_dir: Option<PathBuf>,
    auto_install: bool,
    state: UpdateState,
    session: Option<UpdateSession>,
}

impl UpdateOrchestrator {
    pub fn new(
        checker: UpdateChecker,
        downloader: Box<dyn PackageDownloader>,
        dialog: Box<dyn DialogSurface>,
        process: Box<dyn ProcessControl>,
    ) -> Self {
        Self {
            checker,
            downloader,
            dialog,
            process,
            download_dir: None,
            auto_install: false,
            state: UpdateState::Idle,
            session: None,
        }
    }

    /// Let non-interactive runs proceed straight to download and install.
    /// Off by default; callers must opt in explicitly.
    pub fn auto_install(mut self, enabled: bool) -> Self {
        self.auto_install = enabled;
        self
    }

    /// Override the destination directory (defaults to the user's Downloads)
    pub fn download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    pub fn session(&self) -> Option<&UpdateSession> {
        self.session.as_ref()
    }

    pub fn checker(&self) -> &UpdateChecker {
        &self.checker
    }

    /// Run the pipeline once.
    ///
    /// The returned result describes the check outcome; the later stages are
    /// observable through [`state`](Self::state). Interactive runs ask before
    /// downloading; non-interactive runs stop at `Available` unless
    /// auto-install was enabled.
    pub async fn run(&mut self, interactive: bool) -> UpdateCheckResult {
        self.session = None;
        self.state = UpdateState::Checking;

        let result = self.checker.check(interactive, self.dialog.as_ref()).await;

        if !result.check_succeeded() {
            self.state = UpdateState::Failed("update check failed".to_string());
            return result;
        }
        if !result.update_available() {
            self.state = UpdateState::UpToDate;
            return result;
        }

        let release = match self.checker.latest_release() {
            Some(release) => release.clone(),
            None => {
                self.state = UpdateState::Failed("check carried no release".to_string());
                return result;
            }
        };
        self.state = UpdateState::Available(release.clone());

        if interactive {
            self.state = UpdateState::Confirming;
            if !self.confirm_download(&result, &release) {
                info!("Update deferred by the user");
                self.state = UpdateState::Terminated;
                return result;
            }
        } else if !self.auto_install {
            // Leave the Available outcome for the caller to act on later
            return result;
        }

        self.session = Some(UpdateSession::new(release.clone()));

        self.state = UpdateState::Downloading;
        let package_path = match self.download_stage(&release).await {
            Ok(path) => path,
            Err(e) => {
                error!("Download failed: {}", e);
                if interactive {
                    self.dialog
                        .present_error(&format!("Download failed: {e}"), "Update Error");
                }
                self.session = None;
                self.state = UpdateState::Terminated;
                return result;
            }
        };
        if let Some(session) = self.session.as_mut() {
            session.package_path = Some(package_path.clone());
        }

        self.state = UpdateState::Installing;
        if interactive {
            // Informational only; the pipeline continues regardless
            self.dialog.present_choice(
                &format!(
                    "Update downloaded to {}. The installer will now be launched and \
                     Runehall must restart.",
                    package_path.display()
                ),
                "Restart",
                &["OK"],
            );
        }
        if let Err(e) = install_package(&package_path, self.process.as_ref()) {
            error!("Install failed: {}", e);
            if interactive {
                self.dialog
                    .present_error(&format!("Install failed: {e}"), "Update Error");
            }
            self.session = None;
            self.state = UpdateState::Terminated;
            return result;
        }

        // Sole exit point of the pipeline: the process cannot safely continue
        // after the installer was launched or the package folder revealed.
        self.state = UpdateState::RestartPending;
        info!("Restart pending; exiting for update");
        self.process.exit_process(0);

        // Reached only when process control is mocked out
        self.session = None;
        self.state = UpdateState::Terminated;
        result
    }

    fn confirm_download(&self, result: &UpdateCheckResult, release: &RemoteRelease) -> bool {
        let latest = match release.build_timestamp {
            Some(built) => format!("{} ({})", release.version, built.format("%Y-%m-%d %H:%M:%S")),
            None => release.version.clone(),
        };
        let message = format!(
            "Version {} is available. You are running {}. Download now?",
            latest,
            result.current_version()
        );
        let options = ["Update Now", "Update Later"];
        self.dialog
            .present_choice(&message, "New Version Available", &options)
            == Some(0)
    }

    async fn download_stage(&self, release: &RemoteRelease) -> Result<PathBuf, UpdateError> {
        let destination = self
            .download_dir
            .clone()
            .or_else(default_download_dir)
            .ok_or_else(|| {
                UpdateError::DownloadFailed("no download directory available".to_string())
            })?;
        let filename = upgrade_filename(&release.package_url);

        info!(
            "Downloading update from {} to {}",
            release.package_url,
            destination.display()
        );
        let path = self
            .downloader
            .download(&release.package_url, &destination, &filename)
            .await?;

        let metadata = std::fs::metadata(&path)
            .map_err(|e| UpdateError::DownloadFailed(format!("missing downloaded file: {e}")))?;
        if metadata.len() == 0 {
            return Err(UpdateError::DownloadFailed("empty package".to_string()));
        }
        Ok(path)
    }
}
