use anyhow::{Context, Result};
use std::path::Path;

use region_split::config::PipelineConfig;
use region_split::logging::setup_logging;
use region_split::pipeline::run_balancer;

fn main() -> Result<()> {
    setup_logging(Path::new("logs"), "balance_by_region").context("initializing logging")?;

    let config = PipelineConfig::default();
    let summary = run_balancer(&config)
        .with_context(|| format!("balancing {:?} by region", config.input_path))?;

    println!(
        "Balanced {} regions to {} rows each ({} rows) -> {}",
        summary.counts_before.num_regions(),
        summary.min_count,
        summary.rows_kept,
        config.balanced_path.display()
    );
    Ok(())
}
