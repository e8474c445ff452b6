// # viewsyncd - DNS view sync runner
//
// Runs one bidirectional reconciliation of a zone's A records between
// two Infoblox Universal DDI views, then exits. This is a THIN
// integration layer: all reconciliation logic lives in viewsync-core,
// all transport in viewsync-infoblox.
//
// ## Configuration
//
// Environment variables only; see `config.rs` for the full list.
//
// ## Example
//
// ```bash
// export VIEWSYNC_API_URL=https://csp.infoblox.com
// export VIEWSYNC_API_TOKEN=your_token
// export VIEWSYNC_ZONE=privatelink.blob.core.windows.net.
// export VIEWSYNC_VIEW_A=AZURE-3
// export VIEWSYNC_VIEW_B=AZURE-9
//
// viewsyncd
// ```
//
// ## Exit codes
//
// - 0: both directional passes completed (conflicts are reported but
//   are classified outcomes, not failures)
// - 1: configuration error
// - 2: runtime error (a directional pass could not run)

mod config;

use anyhow::Result;
use config::AppConfig;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use viewsync_core::orchestrator::format_direction;
use viewsync_core::{SyncConfig, SyncSummary, ZoneSyncer};
use viewsync_infoblox::InfobloxClient;

/// Exit codes for the different termination scenarios
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Both passes ran to completion
    Clean = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (a pass aborted)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return SyncExitCode::ConfigError.into();
    }

    if let Err(e) = config.init_tracing() {
        eprintln!("{e}");
        return SyncExitCode::ConfigError.into();
    }

    info!("Starting viewsyncd");
    info!(
        "Zone: {} | Views: {} <-> {}{}",
        config.zone,
        config.view_a,
        config.view_b,
        if config.dry_run { " [DRY-RUN]" } else { "" }
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return SyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_sync(config).await {
            Ok(code) => code,
            Err(e) => {
                error!("Sync failed: {e}");
                SyncExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Build the client and syncer, run one bidirectional pass pair, and
/// report the outcome
async fn run_sync(config: AppConfig) -> Result<SyncExitCode> {
    if config.dry_run {
        warn!("Running in DRY-RUN mode - no changes will be made");
    }

    let client = Arc::new(InfobloxClient::new(
        &config.api_url,
        &config.api_token,
        config.dry_run,
    )?);

    let sync_config = SyncConfig::new(&config.zone, &config.view_a, &config.view_b);
    let (syncer, mut events) = ZoneSyncer::new(client, sync_config)?;

    // Drain sync events for debug visibility; the channel is lossy under
    // backpressure so this task can never stall a pass
    let drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "sync event");
        }
    });

    let summary = syncer.run().await;
    report(&config, &summary);

    drop(syncer);
    drain.await?;

    Ok(if summary.both_completed() {
        SyncExitCode::Clean
    } else {
        SyncExitCode::RuntimeError
    })
}

/// Log the per-direction summary and the conflicting keys an operator
/// has to resolve by hand
fn report(config: &AppConfig, summary: &SyncSummary) {
    info!("{}", format_direction(&config.view_a, &config.view_b, &summary.a_to_b));
    info!("{}", format_direction(&config.view_b, &config.view_a, &summary.b_to_a));

    for (source, result) in [
        (&config.view_a, &summary.a_to_b),
        (&config.view_b, &summary.b_to_a),
    ] {
        if let Ok(sync_report) = result {
            for key in &sync_report.conflicts {
                warn!(
                    "CONFLICT: '{key}' diverged with no sync lineage (seen from {source}); \
                    resolve manually"
                );
            }
        }
    }
}
