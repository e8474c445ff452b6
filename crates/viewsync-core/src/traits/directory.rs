// # Directory Client Trait
//
// Defines the interface the reconciliation core needs from the remote
// directory service hosting the zone's views.
//
// ## Implementations
//
// - Infoblox Universal DDI: `viewsync-infoblox` crate
//
// These three operations are the whole surface the engine consumes.
// View-name to view-id resolution is an implementation detail of record
// creation and stays inside the client.

use crate::error::Result;
use crate::record::ARecord;
use async_trait::async_trait;

/// Trait for directory-service client implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Error Contract
///
/// `list_a_records` must fail with an explicit `Err` when the zone or
/// view cannot be read; it must never return an empty list for a fetch
/// failure, because the engine treats an empty list as "view genuinely
/// holds no records" and would happily recreate everything.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// List the A records of `zone` as seen in `view`.
    ///
    /// Only records of type A are returned, already scoped to the view.
    async fn list_a_records(&self, zone: &str, view: &str) -> Result<Vec<ARecord>>;

    /// Create an A record in `view`.
    ///
    /// # Parameters
    ///
    /// - `view`: target view name (resolved to an id internally)
    /// - `relative_name`: name within the zone; `"@"` for the apex
    /// - `address`: IPv4 literal
    /// - `zone`: zone name
    /// - `annotation`: comment text, carries the provenance marker
    ///
    /// # Returns
    ///
    /// The directory-service id of the created record.
    async fn create_record(
        &self,
        view: &str,
        relative_name: &str,
        address: &str,
        zone: &str,
        annotation: &str,
    ) -> Result<String>;

    /// Update an existing record's address and annotation.
    async fn update_record(&self, record_id: &str, address: &str, annotation: &str) -> Result<()>;
}
