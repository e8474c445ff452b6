//! Configuration types for the view synchronization system

use serde::{Deserialize, Serialize};

/// Main sync configuration: one zone, two views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone to reconcile (absolute form with trailing dot accepted)
    pub zone: String,

    /// First view name
    pub view_a: String,

    /// Second view name
    pub view_b: String,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a configuration for one zone and its two views
    pub fn new(
        zone: impl Into<String>,
        view_a: impl Into<String>,
        view_b: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            view_a: view_a.into(),
            view_b: view_b.into(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_zone_name(&self.zone)?;

        if self.view_a.is_empty() || self.view_b.is_empty() {
            return Err(crate::Error::config("View names cannot be empty"));
        }

        if self.view_a == self.view_b {
            return Err(crate::Error::config(format!(
                "Views must be distinct, got '{}' twice",
                self.view_a
            )));
        }

        if self.engine.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Event channel capacity must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Validate a zone name (RFC 1035 labels, trailing dot accepted).
///
/// Universal DDI stores zones in absolute form, so
/// `privatelink.blob.core.windows.net.` is valid input.
fn validate_zone_name(zone: &str) -> Result<(), crate::Error> {
    if zone.is_empty() {
        return Err(crate::Error::config("Zone name cannot be empty"));
    }

    if zone.len() > 254 {
        return Err(crate::Error::config(format!(
            "Zone name too long: {} chars (max 253 plus trailing dot)",
            zone.len()
        )));
    }

    let relative = zone.strip_suffix('.').unwrap_or(zone);
    for label in relative.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Zone name has empty label: '{zone}'"
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Zone label too long: {} chars (max 63). Label: '{label}'",
                label.len()
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Zone label contains invalid characters. Label: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Zone label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the internal event channel
    ///
    /// When full, new sync events are dropped (with a warning log) so a
    /// slow consumer can never stall the reconciliation pass.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}
