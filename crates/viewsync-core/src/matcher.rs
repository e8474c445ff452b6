//! Record matcher
//!
//! Builds the target-view lookup the engine resolves source records
//! against. Pure functions of their input; the only side effect is an
//! anomaly warning on duplicate keys.

use crate::record::{APEX_KEY, ARecord};
use std::collections::HashMap;
use tracing::warn;

/// Comparison key for a record.
///
/// An empty relative name is the zone apex and normalizes to `"@"` so
/// apex records from both views compare against the same key.
pub fn record_key(record: &ARecord) -> String {
    if record.relative_name.is_empty() {
        APEX_KEY.to_string()
    } else {
        record.relative_name.clone()
    }
}

/// Index records by normalized key.
///
/// Duplicate relative names within one view are an unmodeled condition
/// for this algorithm; the later record wins, and the collision is
/// surfaced as a warning so the operator can fix the view.
pub fn index_by_key(records: &[ARecord]) -> HashMap<String, &ARecord> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let key = record_key(record);
        if let Some(previous) = index.insert(key.clone(), record) {
            warn!(
                key = %key,
                view = %record.view_name,
                shadowed_record_id = %previous.record_id,
                "duplicate relative name in view; later record wins"
            );
        }
    }
    index
}
