use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use region_split::config::PipelineConfig;
use region_split::logging::setup_logging;
use region_split::pipeline::{run_balancer, run_splitter};

fn main() -> Result<()> {
    setup_logging(Path::new("logs"), "region_split").context("initializing logging")?;

    let config = PipelineConfig::default();
    info!("Running full pipeline with seed {}", config.seed);

    run_balancer(&config)
        .with_context(|| format!("balancing {:?} by region", config.input_path))?;
    let report = run_splitter(&config)
        .with_context(|| format!("splitting {:?}", config.balanced_path))?;

    print!("{}", report.render_summary());
    Ok(())
}
