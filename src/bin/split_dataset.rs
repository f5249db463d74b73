use anyhow::{Context, Result};
use std::path::Path;

use region_split::config::PipelineConfig;
use region_split::logging::setup_logging;
use region_split::pipeline::run_splitter;

fn main() -> Result<()> {
    setup_logging(Path::new("logs"), "split_dataset").context("initializing logging")?;

    let config = PipelineConfig::default();
    let report = run_splitter(&config)
        .with_context(|| format!("splitting {:?}", config.balanced_path))?;

    print!("{}", report.render_summary());
    Ok(())
}
