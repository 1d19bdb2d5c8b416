//! Types shared across the update pipeline

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Version metadata fetched from a remote channel source
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRelease {
    /// Version identifier as published (possibly `v`-prefixed)
    pub version: String,
    /// Locator of the downloadable package
    pub package_url: String,
    /// Build timestamp, present only for snapshot builds
    pub build_timestamp: Option<DateTime<Utc>>,
}

/// Outcome of one update check. Constructed through the three named
/// constructors and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCheckResult {
    check_succeeded: bool,
    update_available: bool,
    current_version: String,
    latest_version: Option<String>,
}

impl UpdateCheckResult {
    /// The check itself failed; nothing is known about the remote version.
    pub fn failed(current_version: impl Into<String>) -> Self {
        Self {
            check_succeeded: false,
            update_available: false,
            current_version: current_version.into(),
            latest_version: None,
        }
    }

    /// The check succeeded and the running build is current.
    pub fn up_to_date(current_version: impl Into<String>) -> Self {
        let current = current_version.into();
        Self {
            check_succeeded: true,
            update_available: false,
            latest_version: Some(current.clone()),
            current_version: current,
        }
    }

    /// The check succeeded and a newer build was found.
    pub fn available(current_version: impl Into<String>, latest_version: impl Into<String>) -> Self {
        Self {
            check_succeeded: true,
            update_available: true,
            current_version: current_version.into(),
            latest_version: Some(latest_version.into()),
        }
    }

    pub fn check_succeeded(&self) -> bool {
        self.check_succeeded
    }

    pub fn update_available(&self) -> bool {
        self.update_available
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.as_deref()
    }
}

/// Current stage of the update pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateState {
    /// No update activity
    Idle,
    /// Check in flight
    Checking,
    /// Check failed; cause was logged
    Failed(String),
    /// Check succeeded, no newer version
    UpToDate,
    /// Check succeeded, newer version found
    Available(RemoteRelease),
    /// Waiting for the user to accept or defer
    Confirming,
    /// Package transfer in progress
    Downloading,
    /// Launching the installer / revealing the package
    Installing,
    /// Install initiated; the process must now exit
    RestartPending,
    /// Pipeline finished, session discarded
    Terminated,
}

impl UpdateState {
    /// Returns true if a newer version has been found and not yet abandoned
    pub fn has_update(&self) -> bool {
        matches!(
            self,
            UpdateState::Available(_)
                | UpdateState::Confirming
                | UpdateState::Downloading
                | UpdateState::Installing
                | UpdateState::RestartPending
        )
    }

    /// Returns true if the pipeline can accept a new check request
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpdateState::Idle
                | UpdateState::Failed(_)
                | UpdateState::UpToDate
                | UpdateState::Terminated
        )
    }

    /// Returns the release carried by this state, if any
    pub fn release(&self) -> Option<&RemoteRelease> {
        match self {
            UpdateState::Available(release) => Some(release),
            _ => None,
        }
    }
}

/// Orchestrator-owned state of an accepted update. Lives from acceptance until
/// the process restarts or the pipeline fails; nothing persists across runs.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    pub release: RemoteRelease,
    /// Local package path, set once the download stage completes
    pub package_path: Option<PathBuf>,
}

impl UpdateSession {
    pub fn new(release: RemoteRelease) -> Self {
        Self {
            release,
            package_path: None,
        }
    }
}
