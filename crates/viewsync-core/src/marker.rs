//! Provenance marker codec
//!
//! Every record the engine writes carries a marker naming the view the
//! value was copied from and when. The marker lives inside the record's
//! free-text comment field because the directory API has no structured
//! custom-metadata slot; keeping encode/decode behind this module means
//! only this file changes if one ever appears.
//!
//! The marker is the loop-prevention mechanism: a value only ever
//! propagates away from its origin view, never back toward it.

use chrono::{DateTime, Utc};

/// Leading literal of every marker
const MARKER_PREFIX: &str = "Synced from ";

/// Delimiter between the origin view and the sync timestamp
const MARKER_ON: &str = " on ";

/// Encode a provenance marker for a value copied from `origin_view`.
///
/// Format: `Synced from <view> on <YYYY-MM-DD HH:MM:SS UTC>` with an
/// optional `, created: <ts>` suffix carrying the source record's
/// original creation time (informational only, never parsed back).
pub fn encode(
    origin_view: &str,
    synced_at: DateTime<Utc>,
    source_created_at: Option<&str>,
) -> String {
    let stamp = synced_at.format("%Y-%m-%d %H:%M:%S UTC");
    match source_created_at {
        Some(created) => {
            format!("{MARKER_PREFIX}{origin_view}{MARKER_ON}{stamp}, created: {created}")
        }
        None => format!("{MARKER_PREFIX}{origin_view}{MARKER_ON}{stamp}"),
    }
}

/// Check whether an annotation carries a marker for the given view.
///
/// This is a strict substring test against the encoder's exact tag,
/// including the trailing delimiter, so a view whose name is a prefix of
/// another view's name never matches the longer view's marker and human
/// comments mentioning a view name in prose never collide. Absent or
/// empty annotations never match.
pub fn was_synced_from(annotation: Option<&str>, view: &str) -> bool {
    let Some(annotation) = annotation else {
        return false;
    };
    if annotation.is_empty() {
        return false;
    }
    let tag = format!("{MARKER_PREFIX}{view}{MARKER_ON}");
    annotation.contains(&tag)
}
