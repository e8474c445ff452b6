// # viewsync-check - connectivity and configuration self-test
//
// Validates that a viewsync deployment is ready to run:
//
// - environment configuration is complete and well-formed
// - the Universal DDI API is reachable with the given token
// - both views exist and the zone's records are readable in each
//
// Prints a human-readable report and exits 0 only when both views are
// fully accessible. Performs GET requests only; never writes.

mod config;

use config::AppConfig;
use std::process::ExitCode;
use std::sync::Arc;
use viewsync_infoblox::InfobloxClient;

fn main() -> ExitCode {
    println!("viewsync configuration test");
    println!("{}", "=".repeat(40));

    let config = match AppConfig::from_env().and_then(|cfg| {
        cfg.validate()?;
        Ok(cfg)
    }) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("FAIL configuration: {e}");
            println!();
            println!("Next steps:");
            println!("  1. export VIEWSYNC_API_URL and VIEWSYNC_API_TOKEN");
            println!("  2. export VIEWSYNC_VIEW_A, VIEWSYNC_VIEW_B and VIEWSYNC_ZONE");
            println!("  3. run this test again");
            return ExitCode::from(1);
        }
    };

    println!("OK   configuration loaded");
    println!("     Zone:   {}", config.zone);
    println!("     View A: {}", config.view_a);
    println!("     View B: {}", config.view_b);

    if let Err(e) = config.init_tracing() {
        println!("FAIL logging: {e}");
        return ExitCode::from(1);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            println!("FAIL runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let all_good = rt.block_on(check_views(&config));

    println!("{}", "=".repeat(40));
    if all_good {
        println!("All checks passed. Run the sync with: viewsyncd");
        ExitCode::SUCCESS
    } else {
        println!("Some checks failed. Common issues:");
        println!("  - token invalid or missing DNS permissions");
        println!("  - view names wrong (they are case-sensitive)");
        println!("  - zone missing from one of the views");
        ExitCode::from(1)
    }
}

/// Probe both views for reachability and zone readability
async fn check_views(config: &AppConfig) -> bool {
    let client = match InfobloxClient::new_dry_run(&config.api_url, &config.api_token) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            println!("FAIL client: {e}");
            return false;
        }
    };

    let mut all_good = true;
    for view in [&config.view_a, &config.view_b] {
        use viewsync_core::DirectoryClient;
        match client.list_a_records(&config.zone, view).await {
            Ok(records) => {
                println!("OK   view '{view}': {} A record(s) readable", records.len());
            }
            Err(e) => {
                println!("FAIL view '{view}': {e}");
                all_good = false;
            }
        }
    }
    all_good
}
