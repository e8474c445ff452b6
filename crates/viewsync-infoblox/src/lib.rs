// # Infoblox Universal DDI Directory Client
//
// Implements `viewsync_core::DirectoryClient` against the Universal DDI
// REST API.
//
// ## API Reference
//
// - List/create records: `api/ddi/v1/dns/record`
// - Update record: PATCH `api/ddi/v1/dns/record/:id`
// - List views: `api/ddi/v1/dns/view`
//
// The record endpoint cannot filter by view, so listings are filtered
// client-side on `view_name`. Record creation needs a view *id*, which
// is resolved from the view name on first use and cached for the life
// of the client (one process = one run, so staleness is bounded).
//
// ## Security
//
// The API token never appears in logs; the Debug implementation
// redacts it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use viewsync_core::error::{Error, Result};
use viewsync_core::record::{APEX_KEY, ARecord};
use viewsync_core::traits::DirectoryClient;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Record fields requested from the API
const RECORD_FIELDS: &str =
    "id,name_in_zone,absolute_zone_name,rdata,comment,type,view,view_name,created_at,updated_at";

/// Page size for record listings
const RECORD_LIMIT: usize = 1000;

/// Infoblox Universal DDI client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client performs all GET requests but
/// logs intended POST/PATCH payloads instead of sending them, so a
/// full sync can be rehearsed without touching either view.
pub struct InfobloxClient {
    /// API base URL, no trailing slash
    base_url: String,

    /// API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: read-only, mutations are logged instead of sent
    dry_run: bool,

    /// View-name → view-id cache
    view_ids: Mutex<HashMap<String, String>>,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for InfobloxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfobloxClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl InfobloxClient {
    /// Create a new client
    ///
    /// # Parameters
    ///
    /// - `base_url`: API endpoint, e.g. `https://csp.infoblox.com`
    /// - `api_token`: token with DNS management permissions
    /// - `dry_run`: if true, perform GET requests but skip POST/PATCH
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Infoblox API token cannot be empty"));
        }

        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(Error::config("Infoblox API URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
            dry_run,
            view_ids: Mutex::new(HashMap::new()),
        })
    }

    /// Create a client in live mode
    pub fn new_live(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        Self::new(base_url, api_token, false)
    }

    /// Create a client in dry-run mode
    pub fn new_dry_run(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        Self::new(base_url, api_token, true)
    }

    /// Whether this client is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.api_token)
    }

    /// Map a non-success response to a specific error
    async fn error_for(&self, context: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API token or insufficient permissions ({context}). Status: {status}"
            )),
            404 => Error::not_found(format!("{context}: {status}")),
            429 => Error::rate_limited(format!(
                "Rate limit exceeded ({context}). Please retry later."
            )),
            500..=599 => Error::http(format!(
                "Infoblox server error (transient) during {context}: {status} - {body}"
            )),
            _ => Error::http(format!("{context} failed: {status} - {body}")),
        }
    }

    /// Resolve a view name to its directory-service id, caching the result
    async fn resolve_view_id(&self, view: &str) -> Result<String> {
        if let Some(id) = self.view_ids.lock().await.get(view) {
            return Ok(id.clone());
        }

        tracing::debug!(view, "resolving view id");

        let response = self
            .client
            .get(self.endpoint("api/ddi/v1/dns/view"))
            .header("Authorization", self.authorization())
            .query(&[
                ("_filter", format!("name==\"{view}\"")),
                ("_fields", "id,name".to_string()),
                ("_limit", "10".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.error_for("view lookup", response).await);
        }

        let list: ListResponse<ApiView> = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse view response: {e}")))?;

        let id = list
            .results
            .into_iter()
            .find(|v| v.name == view)
            .map(|v| v.id)
            .ok_or_else(|| Error::not_found(format!("View not found: {view}")))?;

        tracing::debug!(view, id = %id, "resolved view id");
        self.view_ids
            .lock()
            .await
            .insert(view.to_string(), id.clone());
        Ok(id)
    }
}

#[async_trait]
impl DirectoryClient for InfobloxClient {
    /// List the A records of a zone as seen in one view.
    ///
    /// The API does not filter by view, so all of the zone's A records
    /// are fetched and filtered client-side on `view_name`.
    async fn list_a_records(&self, zone: &str, view: &str) -> Result<Vec<ARecord>> {
        tracing::debug!(zone, view, "fetching A records");

        let filter = format!("type==\"A\" and absolute_zone_name==\"{zone}\"");
        let response = self
            .client
            .get(self.endpoint("api/ddi/v1/dns/record"))
            .header("Authorization", self.authorization())
            .query(&[
                ("_filter", filter),
                ("_fields", RECORD_FIELDS.to_string()),
                ("_limit", RECORD_LIMIT.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self
                .error_for(&format!("record listing for zone {zone}"), response)
                .await);
        }

        let list: ListResponse<ApiRecord> = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse record response: {e}")))?;

        let total = list.results.len();
        let records: Vec<ARecord> = list
            .results
            .into_iter()
            .filter(|r| r.view_name.as_deref() == Some(view))
            .filter_map(|r| match r.rdata {
                Some(rdata) => Some(ARecord {
                    relative_name: r.name_in_zone,
                    address: rdata.address,
                    annotation: r.comment,
                    created_at: r.created_at,
                    view_name: view.to_string(),
                    record_id: r.id,
                }),
                None => {
                    tracing::warn!(record_id = %r.id, "record has no rdata, skipping");
                    None
                }
            })
            .collect();

        tracing::info!(
            zone,
            view,
            total,
            in_view = records.len(),
            "fetched A records"
        );
        Ok(records)
    }

    async fn create_record(
        &self,
        view: &str,
        relative_name: &str,
        address: &str,
        zone: &str,
        annotation: &str,
    ) -> Result<String> {
        let view_id = self.resolve_view_id(view).await?;
        let absolute_name = absolute_name_spec(relative_name, zone);

        let payload = serde_json::json!({
            "type": "A",
            "rdata": { "address": address },
            "comment": annotation,
            "absolute_name_spec": absolute_name,
            "view": view_id,
        });

        if self.dry_run {
            tracing::info!(
                view,
                name = %absolute_name,
                address,
                "[DRY-RUN] would POST record: {payload}"
            );
            return Ok("dry-run".to_string());
        }

        tracing::info!(view, name = %absolute_name, address, "creating A record");

        let response = self
            .client
            .post(self.endpoint("api/ddi/v1/dns/record"))
            .header("Authorization", self.authorization())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self
                .error_for(&format!("record creation for {absolute_name}"), response)
                .await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse create response: {e}")))?;

        let id = json["result"]["id"]
            .as_str()
            .ok_or_else(|| Error::http("Invalid response format: result.id is not a string"))?;

        Ok(id.to_string())
    }

    async fn update_record(&self, record_id: &str, address: &str, annotation: &str) -> Result<()> {
        let payload = serde_json::json!({
            "rdata": { "address": address },
            "comment": annotation,
        });

        if self.dry_run {
            tracing::info!(record_id, address, "[DRY-RUN] would PATCH record: {payload}");
            return Ok(());
        }

        tracing::info!(record_id, address, "updating A record");

        let response = self
            .client
            .patch(self.endpoint(&format!("api/ddi/v1/dns/record/{record_id}")))
            .header("Authorization", self.authorization())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self
                .error_for(&format!("record update for {record_id}"), response)
                .await);
        }

        Ok(())
    }
}

/// Absolute name for the creation payload.
///
/// The apex sentinel (or an empty relative name) maps to the zone name
/// itself; anything else is prefixed onto the zone.
fn absolute_name_spec(relative_name: &str, zone: &str) -> String {
    if relative_name.is_empty() || relative_name == APEX_KEY {
        zone.to_string()
    } else {
        format!("{relative_name}.{zone}")
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListResponse<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiView {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiRecord {
    id: String,
    #[serde(default)]
    name_in_zone: String,
    #[serde(default)]
    rdata: Option<ApiRdata>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    view_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRdata {
    address: String,
}
