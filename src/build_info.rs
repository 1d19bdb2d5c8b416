//! Access to the locally running version and build timestamp

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp format used by the build pipeline and the snapshot feed (`build.txt`)
pub(crate) const BUILD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read-only source of the running build's version and timestamp
pub trait VersionInfo: Send + Sync {
    /// Version string of the running build (e.g. "2.0.9" or "2.1.0-SNAPSHOT")
    fn version_string(&self) -> &str;

    /// When the running build was produced, if the build pipeline recorded it
    fn build_timestamp(&self) -> Option<DateTime<Utc>>;

    /// True if the version string denotes an unreleased build
    fn is_development_build(&self) -> bool {
        let version = self.version_string().to_ascii_lowercase();
        version.contains("git") || version.contains("snapshot")
    }
}

/// Version info captured at compile time
#[derive(Debug, Clone)]
pub struct BuildInfo {
    version: String,
    timestamp: Option<DateTime<Utc>>,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            version: version.into(),
            timestamp,
        }
    }

    /// Build info baked in at compile time. The timestamp comes from the
    /// `RUNEHALL_BUILD_TIMESTAMP` env var set by the release pipeline and is
    /// absent on local builds.
    pub fn from_build_env() -> Self {
        let timestamp = option_env!("RUNEHALL_BUILD_TIMESTAMP").and_then(parse_build_timestamp);
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
        }
    }
}

impl VersionInfo for BuildInfo {
    fn version_string(&self) -> &str {
        &self.version
    }

    fn build_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Parse a `%Y-%m-%d %H:%M:%S` timestamp, interpreted as UTC
pub(crate) fn parse_build_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), BUILD_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_timestamp() {
        let ts = parse_build_timestamp("2026-03-14 09:26:53").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-14T09:26:53+00:00");
    }

    #[test]
    fn test_parse_build_timestamp_trims_whitespace() {
        assert!(parse_build_timestamp("2026-03-14 09:26:53\n").is_some());
        assert!(parse_build_timestamp("garbage").is_none());
    }

    #[test]
    fn test_development_build_detection() {
        let release = BuildInfo::new("2.0.9", None);
        assert!(!release.is_development_build());

        let snapshot = BuildInfo::new("2.1.0-SNAPSHOT", None);
        assert!(snapshot.is_development_build());

        let git = BuildInfo::new("GIT", None);
        assert!(git.is_development_build());
    }

    #[test]
    fn test_from_build_env_has_version() {
        let info = BuildInfo::from_build_env();
        assert!(!info.version_string().is_empty());
    }
}
