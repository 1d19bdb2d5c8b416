//! Update checker - resolves the channel, fetches remote metadata, and
//! compares it against the running build
//!
//! This is the single source of truth for the check operation. The async
//! `check` drives the whole sequence; `check_blocking` adapts it for callers
//! that are not on a runtime. Every failure during checking collapses into a
//! failed [`UpdateCheckResult`] - the detailed cause is logged, not returned.

use crate::build_info::VersionInfo;
use crate::channel::{Channel, ChannelResolver};
use crate::compare::{snapshot_is_newer, tag_is_newer};
use crate::error::UpdateError;
use crate::metadata::{build_metadata_client, fetch_channel_release, RemoteEndpoints};
use crate::types::{RemoteRelease, UpdateCheckResult};
use crate::ui::DialogSurface;
use log::{error, info};
use reqwest::Client;

pub struct UpdateChecker {
    version_info: Box<dyn VersionInfo>,
    resolver: ChannelResolver,
    endpoints: RemoteEndpoints,
    client: Client,
    // Written once per check, read by the caller afterwards
    check_attempted: bool,
    check_succeeded: bool,
    latest_fetched_version: Option<String>,
    latest_release: Option<RemoteRelease>,
}

impl UpdateChecker {
    pub fn new(
        version_info: Box<dyn VersionInfo>,
        resolver: ChannelResolver,
    ) -> Result<Self, UpdateError> {
        Self::with_endpoints(version_info, resolver, RemoteEndpoints::default())
    }

    pub fn with_endpoints(
        version_info: Box<dyn VersionInfo>,
        resolver: ChannelResolver,
        endpoints: RemoteEndpoints,
    ) -> Result<Self, UpdateError> {
        Ok(Self {
            version_info,
            resolver,
            endpoints,
            client: build_metadata_client()?,
            check_attempted: false,
            check_succeeded: false,
            latest_fetched_version: None,
            latest_release: None,
        })
    }

    /// Run one update check.
    ///
    /// Returns a result describing the outcome; resolver, network, and parse
    /// failures all collapse to `UpdateCheckResult::failed` with the cause
    /// logged (and surfaced on the dialog for interactive callers).
    pub async fn check(
        &mut self,
        interactive: bool,
        dialog: &dyn DialogSurface,
    ) -> UpdateCheckResult {
        self.check_attempted = true;
        self.check_succeeded = false;
        self.latest_release = None;

        let current = self.version_info.version_string().to_string();
        info!("Starting update check. Current version: {}", current);

        match self.perform_check(interactive, dialog).await {
            Ok((release, newer)) => {
                self.check_succeeded = true;
                self.latest_fetched_version = Some(release.version.clone());
                info!(
                    "Latest available version: {} (current {})",
                    release.version, current
                );
                let result = if newer {
                    UpdateCheckResult::available(current, release.version.clone())
                } else {
                    UpdateCheckResult::up_to_date(current)
                };
                self.latest_release = Some(release);
                result
            }
            Err(UpdateError::UserCancelled) => {
                info!("Update check cancelled by the user");
                UpdateCheckResult::failed(current)
            }
            Err(e) => {
                error!("Update check failed: {}", e);
                if interactive {
                    dialog.present_error(
                        &format!("Error checking for updates: {e}"),
                        "Update Check Error",
                    );
                }
                UpdateCheckResult::failed(current)
            }
        }
    }

    /// Blocking adapter for callers without a runtime. Must not be invoked
    /// from inside an async context.
    pub fn check_blocking(
        &mut self,
        interactive: bool,
        dialog: &dyn DialogSurface,
    ) -> UpdateCheckResult {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Failed to create runtime for update check: {}", e);
                self.check_attempted = true;
                self.check_succeeded = false;
                return UpdateCheckResult::failed(self.version_info.version_string().to_string());
            }
        };
        runtime.block_on(self.check(interactive, dialog))
    }

    async fn perform_check(
        &self,
        interactive: bool,
        dialog: &dyn DialogSurface,
    ) -> Result<(RemoteRelease, bool), UpdateError> {
        let channel = self.resolver.resolve(interactive, dialog)?;

        // Snapshot builds only update meaningfully through the snapshot track;
        // the mod track is exempt because it replaces the whole installation.
        if channel == Channel::Release && self.version_info.is_development_build() {
            info!("Development builds must use the snapshot update channel");
            return Err(UpdateError::ChannelUnresolved);
        }

        let release = fetch_channel_release(&self.client, &self.endpoints, channel).await?;

        let newer = match channel {
            Channel::Snapshot => snapshot_is_newer(
                self.version_info.build_timestamp(),
                release.build_timestamp,
            ),
            Channel::Release | Channel::ModRelease => {
                tag_is_newer(self.version_info.version_string(), &release.version)
            }
            Channel::None => false,
        };

        Ok((release, newer))
    }

    pub fn check_attempted(&self) -> bool {
        self.check_attempted
    }

    pub fn check_succeeded(&self) -> bool {
        self.check_succeeded
    }

    pub fn latest_fetched_version(&self) -> Option<&str> {
        self.latest_fetched_version.as_deref()
    }

    /// Release found by the last successful check, for the orchestrator
    pub fn latest_release(&self) -> Option<&RemoteRelease> {
        self.latest_release.as_ref()
    }

    pub fn current_version(&self) -> &str {
        self.version_info.version_string()
    }
}
