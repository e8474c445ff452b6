//! Contract tests for the bidirectional orchestrator
//!
//! Verifies pass ordering, fresh fetches between passes, convergence,
//! run-to-run quiescence, and that a fetch failure in one direction
//! never discards the other direction's result.

mod common;

use common::*;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use viewsync_core::engine::SyncEvent;
use viewsync_core::orchestrator::ZoneSyncer;
use viewsync_core::record::ARecord;

fn syncer_for(
    directory: &Arc<MockDirectory>,
) -> (ZoneSyncer, tokio::sync::mpsc::Receiver<SyncEvent>) {
    let client: Arc<dyn viewsync_core::DirectoryClient> = directory.clone();
    ZoneSyncer::new(client, test_config()).expect("valid test config")
}

#[tokio::test]
async fn bidirectional_run_converges_both_views() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed(
        "VIEW-A",
        vec![ARecord::new("host-a", "10.0.0.1", "VIEW-A", "a-1")],
    );
    directory.seed(
        "VIEW-B",
        vec![ARecord::new("host-b", "10.0.0.2", "VIEW-B", "b-1")],
    );

    let (syncer, _rx) = syncer_for(&directory);
    let summary = syncer.run().await;

    assert!(summary.both_completed());

    let a_to_b = summary.a_to_b.as_ref().unwrap();
    assert_eq!(a_to_b.created, 1);

    // The reverse pass sees the record the first pass just wrote into
    // VIEW-B, recognizes its own marker, and skips it instead of
    // reflecting it back.
    let b_to_a = summary.b_to_a.as_ref().unwrap();
    assert_eq!(b_to_a.created, 1);
    assert_eq!(b_to_a.skipped_loops, 1);

    assert_eq!(directory.find("VIEW-B", "host-a").unwrap().address, "10.0.0.1");
    assert_eq!(directory.find("VIEW-A", "host-b").unwrap().address, "10.0.0.2");
}

#[tokio::test]
async fn second_run_makes_no_mutations() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed(
        "VIEW-A",
        vec![ARecord::new("host-a", "10.0.0.1", "VIEW-A", "a-1")],
    );
    directory.seed(
        "VIEW-B",
        vec![ARecord::new("host-b", "10.0.0.2", "VIEW-B", "b-1")],
    );

    let (syncer, _rx) = syncer_for(&directory);
    let first = syncer.run().await;
    assert!(first.both_completed());
    let mutations_after_first = directory.mutation_calls();

    let second = syncer.run().await;
    assert!(second.both_completed());
    assert!(second.a_to_b.as_ref().unwrap().is_quiescent());
    assert!(second.b_to_a.as_ref().unwrap().is_quiescent());
    assert_eq!(
        directory.mutation_calls(),
        mutations_after_first,
        "second run must not touch the directory"
    );
}

#[tokio::test]
async fn each_pass_fetches_fresh_record_sets() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed("VIEW-A", vec![]);
    directory.seed("VIEW-B", vec![]);

    let (syncer, _rx) = syncer_for(&directory);
    let summary = syncer.run().await;

    assert!(summary.both_completed());
    // Two views fetched per directional pass, nothing shared
    assert_eq!(directory.list_calls(), 4);
}

#[tokio::test]
async fn failed_direction_does_not_discard_the_other() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed(
        "VIEW-A",
        vec![ARecord::new("host-a", "10.0.0.1", "VIEW-A", "a-1")],
    );
    directory.seed(
        "VIEW-B",
        vec![ARecord::new("host-b", "10.0.0.2", "VIEW-B", "b-1")],
    );
    // First list call (A->B pass fetching VIEW-A) fails; everything after
    // succeeds, so only the first direction aborts.
    directory.fail_next_lists(1);

    let (syncer, _rx) = syncer_for(&directory);
    let summary = syncer.run().await;

    assert!(summary.a_to_b.is_err());
    let b_to_a = summary.b_to_a.as_ref().expect("reverse pass still runs");
    assert_eq!(b_to_a.created, 1);
    assert_eq!(directory.find("VIEW-A", "host-b").unwrap().address, "10.0.0.2");
}

#[tokio::test]
async fn unreachable_view_fails_both_directions_but_both_are_attempted() {
    // Every pass fetches both views, so a dead view aborts both
    // directions; the orchestrator must still try each one.
    let directory = Arc::new(MockDirectory::new());
    directory.seed("VIEW-B", vec![]);
    directory.set_unreachable("VIEW-A");

    let (syncer, _rx) = syncer_for(&directory);
    let summary = syncer.run().await;

    assert!(summary.a_to_b.is_err());
    assert!(summary.b_to_a.is_err());
    // Pass 1 dies on its first fetch (VIEW-A); pass 2 lists VIEW-B, then
    // dies fetching VIEW-A as target.
    assert_eq!(directory.list_calls(), 3);
    assert_eq!(directory.mutation_calls(), 0);
}

#[tokio::test]
async fn conflicts_are_aggregated_across_directions() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed(
        "VIEW-A",
        vec![ARecord::new("host1", "10.0.0.1", "VIEW-A", "a-1")],
    );
    directory.seed(
        "VIEW-B",
        vec![ARecord::new("host1", "10.0.0.2", "VIEW-B", "b-1")],
    );

    let (syncer, _rx) = syncer_for(&directory);
    let summary = syncer.run().await;

    assert!(summary.both_completed());
    assert_eq!(summary.total_conflicts(), 2);
    assert_eq!(directory.mutation_calls(), 0);
}

#[tokio::test]
async fn run_emits_pass_lifecycle_events() {
    let directory = Arc::new(MockDirectory::new());
    directory.seed("VIEW-A", vec![]);
    directory.seed("VIEW-B", vec![]);
    directory.fail_next_lists(1);

    let (syncer, mut rx) = syncer_for(&directory);
    syncer.run().await;

    let mut saw_failed = false;
    let mut saw_started = false;
    let mut saw_completed = false;
    loop {
        match rx.try_recv() {
            Ok(SyncEvent::PassFailed { source_view, .. }) => {
                assert_eq!(source_view, "VIEW-A");
                saw_failed = true;
            }
            Ok(SyncEvent::PassStarted { source_view, .. }) => {
                assert_eq!(source_view, "VIEW-B");
                saw_started = true;
            }
            Ok(SyncEvent::PassCompleted { source_view, .. }) => {
                assert_eq!(source_view, "VIEW-B");
                saw_completed = true;
            }
            Ok(_) => {}
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
        }
    }
    assert!(saw_failed && saw_started && saw_completed);
}

#[tokio::test]
async fn identical_views_are_rejected_at_construction() {
    let directory = Arc::new(MockDirectory::new());
    let client: Arc<dyn viewsync_core::DirectoryClient> = directory;
    let config = viewsync_core::SyncConfig::new("example.com.", "VIEW-A", "VIEW-A");
    assert!(ZoneSyncer::new(client, config).is_err());
}
