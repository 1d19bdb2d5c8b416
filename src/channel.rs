//! Update channels and channel resolution

use crate::error::UpdateError;
use crate::ui::DialogSurface;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Update track a check runs against. Determines where version metadata is
/// sourced and which comparison rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// No channel configured; must be resolved interactively
    None,
    /// Daily timestamp-identified builds
    Snapshot,
    /// Tagged official releases
    Release,
    /// Tagged releases of the community mod, served from the release registry
    ModRelease,
}

impl Channel {
    /// Stable wire/preference name for this channel
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::None => "none",
            Channel::Snapshot => "snapshot",
            Channel::Release => "release",
            Channel::ModRelease => "mod_release",
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Channel::None
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a configured channel preference to the channel a check actually uses.
///
/// A forced channel (e.g. a mod build permanently wired to `ModRelease`)
/// bypasses both the preference and any dialog.
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    preference: Channel,
    forced: Option<Channel>,
}

impl ChannelResolver {
    pub fn new(preference: Channel) -> Self {
        Self {
            preference,
            forced: None,
        }
    }

    /// Resolver that always yields `channel`, ignoring preference and dialogs.
    pub fn forced(channel: Channel) -> Self {
        Self {
            preference: Channel::None,
            forced: Some(channel),
        }
    }

    /// Resolve the channel for one check.
    ///
    /// With no preference set, interactive callers get a channel picker;
    /// non-interactive callers fail with `ChannelUnresolved` before any
    /// network activity.
    pub fn resolve(
        &self,
        interactive: bool,
        dialog: &dyn DialogSurface,
    ) -> Result<Channel, UpdateError> {
        if let Some(forced) = self.forced {
            info!("Update channel forced to '{}'", forced);
            return Ok(forced);
        }

        if self.preference != Channel::None {
            return Ok(self.preference);
        }

        if !interactive {
            return Err(UpdateError::ChannelUnresolved);
        }

        let options = ["Cancel", "Release", "Snapshot"];
        let selected = dialog.present_choice(
            "You have not chosen an update channel. Which releases should be checked?",
            "Manual update check",
            &options,
        );
        match selected {
            Some(1) => Ok(Channel::Release),
            Some(2) => Ok(Channel::Snapshot),
            // Cancel, closed dialog, or anything out of range
            _ => Err(UpdateError::UserCancelled),
        }
    }
}
