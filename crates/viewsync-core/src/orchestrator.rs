//! Sync orchestrator
//!
//! Runs the reconciliation engine in both directions for one zone and
//! aggregates the results. Passes are strictly sequential: the second
//! pass must observe the first pass's committed writes (and skip them
//! via their fresh provenance markers), so record sets are re-fetched
//! immediately before each pass rather than shared between them.

use crate::config::SyncConfig;
use crate::engine::{ReconcileEngine, SyncEvent, fetch_error};
use crate::error::Result;
use crate::record::{ARecord, SyncReport, SyncSummary};
use crate::traits::DirectoryClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Bidirectional synchronizer for one zone across two views
pub struct ZoneSyncer {
    client: Arc<dyn DirectoryClient>,
    config: SyncConfig,
    engine: ReconcileEngine,
}

impl ZoneSyncer {
    /// Create a new syncer
    ///
    /// Validates the configuration up front.
    ///
    /// # Returns
    ///
    /// A tuple of (syncer, event_receiver) where the receiver yields
    /// [`SyncEvent`]s for monitoring.
    pub fn new(
        client: Arc<dyn DirectoryClient>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);
        let engine = ReconcileEngine::new(Arc::clone(&client), tx);

        Ok((
            Self {
                client,
                config,
                engine,
            },
            rx,
        ))
    }

    /// Run one bidirectional sync: A→B, then B→A.
    ///
    /// A directional pass that cannot fetch its record sets is aborted
    /// and reported as `Err`, but the other direction still runs; the
    /// summary always carries whatever completed.
    pub async fn run(&self) -> SyncSummary {
        info!(
            zone = %self.config.zone,
            view_a = %self.config.view_a,
            view_b = %self.config.view_b,
            "starting bidirectional sync"
        );

        let a_to_b = self.run_pass(&self.config.view_a, &self.config.view_b).await;
        let b_to_a = self.run_pass(&self.config.view_b, &self.config.view_a).await;

        let summary = SyncSummary { a_to_b, b_to_a };
        info!(
            completed = summary.both_completed(),
            conflicts = summary.total_conflicts(),
            "bidirectional sync finished"
        );
        summary
    }

    /// Run one directional pass with fresh fetches of both record sets
    async fn run_pass(&self, source_view: &str, target_view: &str) -> Result<SyncReport> {
        let (source_records, target_records) =
            match self.fetch_both(source_view, target_view).await {
                Ok(sets) => sets,
                Err(e) => {
                    error!("pass {source_view} -> {target_view} aborted: {e}");
                    self.engine.emit(SyncEvent::PassFailed {
                        source_view: source_view.to_string(),
                        target_view: target_view.to_string(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };

        self.engine.emit(SyncEvent::PassStarted {
            source_view: source_view.to_string(),
            target_view: target_view.to_string(),
            source_count: source_records.len(),
            target_count: target_records.len(),
        });

        let report = self
            .engine
            .reconcile_one_way(
                &source_records,
                &target_records,
                source_view,
                target_view,
                &self.config.zone,
            )
            .await;

        self.engine.emit(SyncEvent::PassCompleted {
            source_view: source_view.to_string(),
            target_view: target_view.to_string(),
            report: report.clone(),
        });

        Ok(report)
    }

    /// Fetch record sets for both views of the zone
    async fn fetch_both(
        &self,
        source_view: &str,
        target_view: &str,
    ) -> Result<(Vec<ARecord>, Vec<ARecord>)> {
        let source = self
            .client
            .list_a_records(&self.config.zone, source_view)
            .await
            .map_err(|e| fetch_error(source_view, e))?;
        let target = self
            .client
            .list_a_records(&self.config.zone, target_view)
            .await
            .map_err(|e| fetch_error(target_view, e))?;
        Ok((source, target))
    }
}

/// Render a one-line human summary for a directional result
pub fn format_direction(source_view: &str, target_view: &str, result: &Result<SyncReport>) -> String {
    match result {
        Ok(report) => format!(
            "{source_view} -> {target_view}: {} created, {} updated, {} in sync, {} loop-skipped, {} conflicted, {} failed",
            report.created,
            report.updated,
            report.in_sync,
            report.skipped_loops,
            report.conflicted(),
            report.failed,
        ),
        Err(e) => format!("{source_view} -> {target_view}: pass aborted ({e})"),
    }
}
