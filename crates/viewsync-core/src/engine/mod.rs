//! Core reconciliation engine
//!
//! The engine drives one directional pass: every record of the source
//! view is classified against an index of the target view, and the
//! resulting action (create, update, nothing) is applied through the
//! [`DirectoryClient`].
//!
//! ## Decision table, per source record
//!
//! ```text
//! source carries target's marker            -> SKIP (loop guard)
//! key absent in target                      -> CREATE
//! target address equal                      -> NOOP
//! target address differs,
//!   target carries source's marker          -> UPDATE (lineage-gated)
//! target address differs, no lineage        -> CONFLICT (terminal)
//! ```
//!
//! Classification is pure ([`plan_action`]); only the application step
//! touches the network. A record is never deleted: absence is healed by
//! creation, never propagated as deletion.

use crate::error::Error;
use crate::marker;
use crate::matcher;
use crate::record::{ARecord, SyncReport};
use crate::traits::DirectoryClient;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted during reconciliation
///
/// Consumed from the channel handed out by
/// [`ZoneSyncer::new`](crate::orchestrator::ZoneSyncer::new); intended
/// for monitoring and test assertions, not for control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A directional pass is starting
    PassStarted {
        source_view: String,
        target_view: String,
        source_count: usize,
        target_count: usize,
    },

    /// A record was created in the target view
    RecordCreated { key: String, address: String },

    /// A record in the target view was advanced to the source value
    RecordUpdated {
        key: String,
        previous_address: String,
        new_address: String,
    },

    /// Both sides hold independently-changed values; nothing was written
    ConflictDetected {
        key: String,
        source_address: String,
        target_address: String,
    },

    /// Source record originated from the target view; skipped
    LoopSkipped { key: String },

    /// A create/update call failed; the pass continued
    RecordFailed { key: String, error: String },

    /// A directional pass finished
    PassCompleted {
        source_view: String,
        target_view: String,
        report: SyncReport,
    },

    /// A directional pass could not run at all
    PassFailed {
        source_view: String,
        target_view: String,
        error: String,
    },
}

/// Planned disposition for one source record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Source record was last populated from the target view; writing it
    /// back would only reflect the target's own data at it
    SkipLoop,

    /// Key missing in the target view
    Create,

    /// Addresses already equal
    Noop,

    /// Target diverged but its current value descends from the source
    /// view, so the source is authoritative for this lineage
    Update {
        /// Id of the target record to patch
        record_id: String,
        /// Target's address before the update
        previous_address: String,
    },

    /// Diverged with no established lineage; surfaced, never resolved
    Conflict {
        /// Target's current address
        target_address: String,
    },
}

/// Classify one source record against the target index.
///
/// Pure function of its inputs; the decision table lives here and
/// nowhere else.
pub fn plan_action(
    source: &ARecord,
    target_index: &HashMap<String, &ARecord>,
    source_view: &str,
    target_view: &str,
) -> SyncAction {
    // Loop guard first: a record that came from the target must never
    // flow back, regardless of what the target currently holds.
    if marker::was_synced_from(source.annotation.as_deref(), target_view) {
        return SyncAction::SkipLoop;
    }

    let key = matcher::record_key(source);
    let Some(target) = target_index.get(&key) else {
        return SyncAction::Create;
    };

    if target.address == source.address {
        return SyncAction::Noop;
    }

    if marker::was_synced_from(target.annotation.as_deref(), source_view) {
        SyncAction::Update {
            record_id: target.record_id.clone(),
            previous_address: target.address.clone(),
        }
    } else {
        SyncAction::Conflict {
            target_address: target.address.clone(),
        }
    }
}

/// Reconciliation engine for one directory service
pub struct ReconcileEngine {
    /// Client for target-view mutations
    client: Arc<dyn DirectoryClient>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl ReconcileEngine {
    /// Create an engine writing through `client` and reporting on `event_tx`
    pub fn new(client: Arc<dyn DirectoryClient>, event_tx: mpsc::Sender<SyncEvent>) -> Self {
        Self { client, event_tx }
    }

    /// Run one directional pass from `source_view` into `target_view`.
    ///
    /// Per-record failures are logged, counted in the report, and never
    /// abort the pass; the returned [`SyncReport`] accounts for every
    /// source record exactly once.
    pub async fn reconcile_one_way(
        &self,
        source_records: &[ARecord],
        target_records: &[ARecord],
        source_view: &str,
        target_view: &str,
        zone: &str,
    ) -> SyncReport {
        info!(
            source_view,
            target_view,
            zone,
            source_records = source_records.len(),
            target_records = target_records.len(),
            "reconciling"
        );

        let target_index = matcher::index_by_key(target_records);
        let mut report = SyncReport::default();

        for source in source_records {
            let key = matcher::record_key(source);
            match plan_action(source, &target_index, source_view, target_view) {
                SyncAction::SkipLoop => {
                    debug!(key = %key, "skipping, record originated from {target_view}");
                    report.skipped_loops += 1;
                    self.emit(SyncEvent::LoopSkipped { key });
                }
                SyncAction::Noop => {
                    debug!(key = %key, "already in sync");
                    report.in_sync += 1;
                }
                SyncAction::Create => {
                    let annotation =
                        marker::encode(source_view, Utc::now(), source.created_at.as_deref());
                    match self
                        .client
                        .create_record(target_view, &key, &source.address, zone, &annotation)
                        .await
                    {
                        Ok(record_id) => {
                            info!(key = %key, address = %source.address, record_id = %record_id,
                                  "created record in {target_view}");
                            report.created += 1;
                            self.emit(SyncEvent::RecordCreated {
                                key,
                                address: source.address.clone(),
                            });
                        }
                        Err(e) => {
                            error!(key = %key, "failed to create record in {target_view}: {e}");
                            report.failed += 1;
                            self.emit(SyncEvent::RecordFailed {
                                key,
                                error: e.to_string(),
                            });
                        }
                    }
                }
                SyncAction::Update {
                    record_id,
                    previous_address,
                } => {
                    let annotation =
                        marker::encode(source_view, Utc::now(), source.created_at.as_deref());
                    match self
                        .client
                        .update_record(&record_id, &source.address, &annotation)
                        .await
                    {
                        Ok(()) => {
                            info!(key = %key, "updated {previous_address} -> {} in {target_view}",
                                  source.address);
                            report.updated += 1;
                            self.emit(SyncEvent::RecordUpdated {
                                key,
                                previous_address,
                                new_address: source.address.clone(),
                            });
                        }
                        Err(e) => {
                            error!(key = %key, "failed to update record in {target_view}: {e}");
                            report.failed += 1;
                            self.emit(SyncEvent::RecordFailed {
                                key,
                                error: e.to_string(),
                            });
                        }
                    }
                }
                SyncAction::Conflict { target_address } => {
                    warn!(
                        key = %key,
                        source_address = %source.address,
                        target_address = %target_address,
                        "CONFLICT: both views changed independently, skipping"
                    );
                    report.conflicts.push(key.clone());
                    self.emit(SyncEvent::ConflictDetected {
                        key,
                        source_address: source.address.clone(),
                        target_address,
                    });
                }
            }
        }

        report
    }

    /// Emit a sync event, dropping it with a warning when the channel is
    /// full; a slow consumer must never stall a pass
    pub(crate) fn emit(&self, event: SyncEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event");
        }
    }
}

/// Map a fetch failure to the pass-level error the orchestrator reports
pub(crate) fn fetch_error(view: &str, err: Error) -> Error {
    match err {
        Error::Directory { .. } => err,
        other => Error::directory(view, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(records: &[ARecord]) -> HashMap<String, &ARecord> {
        matcher::index_by_key(records)
    }

    #[test]
    fn plan_prefers_loop_guard_over_everything() {
        // Even a missing target entry does not override the loop guard
        let marker = marker::encode("B", Utc::now(), None);
        let source = ARecord::new("host1", "10.0.0.1", "A", "a-1").with_annotation(marker);
        let target: Vec<ARecord> = vec![];
        assert_eq!(
            plan_action(&source, &index(&target), "A", "B"),
            SyncAction::SkipLoop
        );
    }

    #[test]
    fn plan_creates_when_target_lacks_key() {
        let source = ARecord::new("host1", "10.0.0.1", "A", "a-1");
        let target: Vec<ARecord> = vec![];
        assert_eq!(
            plan_action(&source, &index(&target), "A", "B"),
            SyncAction::Create
        );
    }

    #[test]
    fn plan_noops_on_equal_addresses() {
        let source = ARecord::new("host1", "10.0.0.1", "A", "a-1");
        let target = vec![ARecord::new("host1", "10.0.0.1", "B", "b-1")];
        assert_eq!(
            plan_action(&source, &index(&target), "A", "B"),
            SyncAction::Noop
        );
    }

    #[test]
    fn plan_updates_only_with_source_lineage() {
        let source = ARecord::new("host1", "10.0.0.2", "A", "a-1");
        let lineage = marker::encode("A", Utc::now(), None);
        let target = vec![ARecord::new("host1", "10.0.0.1", "B", "b-1").with_annotation(lineage)];
        assert_eq!(
            plan_action(&source, &index(&target), "A", "B"),
            SyncAction::Update {
                record_id: "b-1".to_string(),
                previous_address: "10.0.0.1".to_string(),
            }
        );
    }

    #[test]
    fn plan_conflicts_without_lineage() {
        let source = ARecord::new("host1", "10.0.0.2", "A", "a-1");
        let target = vec![
            ARecord::new("host1", "10.0.0.1", "B", "b-1")
                .with_annotation("hand-maintained, ask the storage team"),
        ];
        assert_eq!(
            plan_action(&source, &index(&target), "A", "B"),
            SyncAction::Conflict {
                target_address: "10.0.0.1".to_string(),
            }
        );
    }
}
