//! Environment configuration shared by the viewsync binaries
//!
//! All configuration is done via environment variables:
//!
//! - `VIEWSYNC_API_URL`: API endpoint (e.g. `https://csp.infoblox.com`)
//! - `VIEWSYNC_API_TOKEN`: API token with DNS management permissions
//! - `VIEWSYNC_ZONE`: zone to reconcile (defaults to
//!   `privatelink.blob.core.windows.net.`)
//! - `VIEWSYNC_VIEW_A` / `VIEWSYNC_VIEW_B`: the two view names
//! - `VIEWSYNC_MODE`: set to `dry-run` to rehearse without writing
//! - `VIEWSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)

use anyhow::Result;
use std::env;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Application configuration
#[allow(dead_code)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: String,
    pub zone: String,
    pub view_a: String,
    pub view_b: String,
    pub dry_run: bool,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("VIEWSYNC_API_URL")
                .map_err(|_| anyhow::anyhow!("VIEWSYNC_API_URL is required"))?,
            api_token: env::var("VIEWSYNC_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("VIEWSYNC_API_TOKEN is required"))?,
            zone: env::var("VIEWSYNC_ZONE")
                .unwrap_or_else(|_| "privatelink.blob.core.windows.net.".to_string()),
            view_a: env::var("VIEWSYNC_VIEW_A")
                .map_err(|_| anyhow::anyhow!("VIEWSYNC_VIEW_A is required"))?,
            view_b: env::var("VIEWSYNC_VIEW_B")
                .map_err(|_| anyhow::anyhow!("VIEWSYNC_VIEW_B is required"))?,
            dry_run: env::var("VIEWSYNC_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
            log_level: env::var("VIEWSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Zone and view constraints are validated again by the core at
    /// syncer construction; the checks here catch the mistakes that
    /// produce confusing API errors later (placeholder tokens, wrong
    /// URL schemes).
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            anyhow::bail!(
                "VIEWSYNC_API_URL must use HTTP or HTTPS scheme. Got: {}",
                self.api_url
            );
        }

        if self.api_url.starts_with("http://") {
            eprintln!("WARNING: VIEWSYNC_API_URL uses HTTP (not HTTPS). Consider using HTTPS.");
        }

        if self.api_token.len() < 20 {
            anyhow::bail!(
                "VIEWSYNC_API_TOKEN appears too short ({} chars). \
                Verify your token is correct.",
                self.api_token.len()
            );
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower.contains("example")
        {
            anyhow::bail!(
                "VIEWSYNC_API_TOKEN appears to be a placeholder. \
                Use an actual API token from Infoblox."
            );
        }

        if self.view_a.is_empty() || self.view_b.is_empty() {
            anyhow::bail!(
                "VIEWSYNC_VIEW_A and VIEWSYNC_VIEW_B are required. \
                Set them via: export VIEWSYNC_VIEW_A=AZURE-3 VIEWSYNC_VIEW_B=AZURE-9"
            );
        }

        if self.view_a == self.view_b {
            anyhow::bail!(
                "VIEWSYNC_VIEW_A and VIEWSYNC_VIEW_B must name different views. Got '{}' twice.",
                self.view_a
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "VIEWSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Install the global tracing subscriber at the configured level
    pub fn init_tracing(&self) -> Result<()> {
        let log_level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))
    }
}
