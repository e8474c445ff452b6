//! Record model and per-run result types
//!
//! Records are owned by the remote directory service; everything in this
//! module is a transient in-memory projection rebuilt on every run.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Relative-name sentinel for the zone apex
pub const APEX_KEY: &str = "@";

/// A DNS A record as seen in one view of a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ARecord {
    /// Name within the zone; the apex is represented by [`APEX_KEY`]
    pub relative_name: String,

    /// IPv4 literal as returned by the directory service.
    ///
    /// Compared verbatim; the directory service owns validation.
    pub address: String,

    /// Free-text comment field; may carry a provenance marker or
    /// arbitrary human text
    pub annotation: Option<String>,

    /// Origin-view creation timestamp, propagated into markers but
    /// never parsed or compared
    pub created_at: Option<String>,

    /// Name of the view this record lives in
    pub view_name: String,

    /// Directory-service record id; required for updates, never for creates
    pub record_id: String,
}

impl ARecord {
    /// Create a record with the minimal fields the engine consumes
    pub fn new(
        relative_name: impl Into<String>,
        address: impl Into<String>,
        view_name: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            relative_name: relative_name.into(),
            address: address.into(),
            annotation: None,
            created_at: None,
            view_name: view_name.into(),
            record_id: record_id.into(),
        }
    }

    /// Set the annotation
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Set the creation timestamp
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

/// Outcome of one directional reconciliation pass
///
/// Counters cover every disposition a source record can take; a record is
/// counted in exactly one of them. Conflicting keys are retained verbatim
/// so the operator knows what to resolve by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Records created in the target view
    pub created: usize,

    /// Records updated in the target view (lineage-gated)
    pub updated: usize,

    /// Records skipped because they originated from the target view
    pub skipped_loops: usize,

    /// Records already identical on both sides
    pub in_sync: usize,

    /// Records whose create/update call failed (pass continued)
    pub failed: usize,

    /// Keys of records diverged with no established lineage
    pub conflicts: Vec<String>,
}

impl SyncReport {
    /// Number of conflicting records
    pub fn conflicted(&self) -> usize {
        self.conflicts.len()
    }

    /// True when the pass made no mutations and hit no failures
    pub fn is_quiescent(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.failed == 0
    }
}

/// Outcome of one bidirectional run
///
/// Each direction carries its own result so a fetch failure in one
/// direction never discards the other direction's report.
#[derive(Debug)]
pub struct SyncSummary {
    /// View A as source, view B as target
    pub a_to_b: Result<SyncReport, Error>,

    /// View B as source, view A as target
    pub b_to_a: Result<SyncReport, Error>,
}

impl SyncSummary {
    /// True when both directional passes ran to completion
    pub fn both_completed(&self) -> bool {
        self.a_to_b.is_ok() && self.b_to_a.is_ok()
    }

    /// Total conflicting keys across both directions
    pub fn total_conflicts(&self) -> usize {
        [&self.a_to_b, &self.b_to_a]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.conflicted())
            .sum()
    }
}
