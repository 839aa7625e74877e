//! robinson-map - Robinson world maps of study sites
//!
//! This is the main entry point for the robinson-map application.

use tracing::{error, info, warn};

use robinson_map::{init_tracing, log_error, Config, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        init_tracing("info");
        error!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting robinson-map v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        log_error(&e, "validating configuration");
        e
    })?;

    if let Some(path) = &config.input.sites_path {
        info!("Reading sites from {:?}", path);
    }

    let summary = robinson_map::run(&config).map_err(|e| {
        log_error(&e, "rendering map");
        e
    })?;

    info!(
        "Projected {} of {} sites with {} graticule labels",
        summary.sites_projected, summary.sites_read, summary.labels
    );
    if summary.sites_skipped > 0 {
        warn!(
            "{} sites were skipped for missing coordinates",
            summary.sites_skipped
        );
    }
    for file in &summary.files {
        info!("Wrote {}", file.display());
    }

    Ok(())
}
