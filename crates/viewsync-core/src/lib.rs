// # viewsync-core
//
// Core library for bidirectional DNS view reconciliation.
//
// ## Architecture Overview
//
// This library reconciles the A records of one zone across two views of
// a remote directory service:
//
// - **DirectoryClient**: Trait for listing/creating/updating records
// - **marker**: Provenance marker codec (loop prevention)
// - **matcher**: Keyed lookup of a view's record set
// - **ReconcileEngine**: Classifies and resolves each source record
// - **ZoneSyncer**: Runs the engine A→B then B→A and aggregates results
//
// ## Design Principles
//
// 1. **Propagate away from the origin, never back**: every write embeds
//    a provenance marker; a record carrying the target's marker is never
//    pushed at the target again
// 2. **Surface conflicts, never resolve them**: independently-changed
//    records are reported, not overwritten
// 3. **Never delete**: absence in one view is healed by creation only
// 4. **Stateless**: both views are re-fetched fresh every pass; nothing
//    is cached across invocations

pub mod config;
pub mod engine;
pub mod error;
pub mod marker;
pub mod matcher;
pub mod orchestrator;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, SyncConfig};
pub use engine::{ReconcileEngine, SyncAction, SyncEvent, plan_action};
pub use error::{Error, Result};
pub use orchestrator::ZoneSyncer;
pub use record::{APEX_KEY, ARecord, SyncReport, SyncSummary};
pub use traits::DirectoryClient;
