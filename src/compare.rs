//! Channel-specific version comparison rules
//!
//! Tagged channels compare normalized identifiers for equality only: tags have
//! no defined ordering, so any difference is treated as an upgrade path.
//! The snapshot channel compares build timestamps with a staleness threshold
//! so rapid successive rebuilds don't flap between "newer" and "current".

use chrono::{DateTime, Utc};

/// Whole elapsed hours a remote snapshot must exceed before it counts as newer
pub const SNAPSHOT_STALE_HOURS: i64 = 23;

/// Strip a single leading tag marker (`v` or `V`) if present
pub fn normalize_tag(tag: &str) -> &str {
    let trimmed = tag.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Tagged-channel rule: equal normalized identifiers mean up to date, any
/// difference means the remote is assumed newer.
pub fn tag_is_newer(current: &str, remote: &str) -> bool {
    normalize_tag(current) != normalize_tag(remote)
}

/// Snapshot rule: the remote build counts as newer only when more than
/// [`SNAPSHOT_STALE_HOURS`] whole hours elapsed between the two build
/// timestamps. Missing either timestamp means no update.
pub fn snapshot_is_newer(
    local: Option<DateTime<Utc>>,
    remote: Option<DateTime<Utc>>,
) -> bool {
    match (local, remote) {
        (Some(local), Some(remote)) => (remote - local).num_hours() > SNAPSHOT_STALE_HOURS,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(raw: &str) -> DateTime<Utc> {
        crate::build_info::parse_build_timestamp(raw).unwrap()
    }

    #[test]
    fn test_normalize_strips_single_marker() {
        assert_eq!(normalize_tag("v2.1.0"), "2.1.0");
        assert_eq!(normalize_tag("V2.1.0"), "2.1.0");
        assert_eq!(normalize_tag("2.1.0"), "2.1.0");
        // only one marker is stripped
        assert_eq!(normalize_tag("vv2.1.0"), "v2.1.0");
    }

    #[test]
    fn test_identical_tags_are_up_to_date() {
        assert!(!tag_is_newer("2.0.9", "2.0.9"));
        assert!(!tag_is_newer("2.0.9", "v2.0.9"));
        assert!(!tag_is_newer("v2.0.9", "2.0.9"));
    }

    #[test]
    fn test_any_tag_difference_is_an_update() {
        assert!(tag_is_newer("2.0.9", "v2.1.0"));
        // no ordering: a lexically "older" remote still counts as an update
        assert!(tag_is_newer("2.1.0", "v2.0.9"));
        assert!(tag_is_newer("2.0.9", "nightly-7"));
    }

    #[test]
    fn test_snapshot_past_threshold_is_newer() {
        let local = ts("2026-03-14 09:00:00");
        assert!(snapshot_is_newer(Some(local), Some(local + Duration::hours(24))));
        assert!(snapshot_is_newer(Some(local), Some(local + Duration::days(3))));
    }

    #[test]
    fn test_snapshot_boundary_at_threshold_is_not_newer() {
        let local = ts("2026-03-14 09:00:00");
        assert!(!snapshot_is_newer(
            Some(local),
            Some(local + Duration::hours(SNAPSHOT_STALE_HOURS))
        ));
        assert!(!snapshot_is_newer(Some(local), Some(local + Duration::hours(1))));
        assert!(!snapshot_is_newer(Some(local), Some(local)));
    }

    #[test]
    fn test_snapshot_older_remote_is_not_newer() {
        let local = ts("2026-03-14 09:00:00");
        assert!(!snapshot_is_newer(
            Some(local),
            Some(local - Duration::days(2))
        ));
    }

    #[test]
    fn test_snapshot_missing_timestamp_is_not_newer() {
        let some = Some(ts("2026-03-14 09:00:00"));
        assert!(!snapshot_is_newer(None, some));
        assert!(!snapshot_is_newer(some, None));
        assert!(!snapshot_is_newer(None, None));
    }
}
