//! Run report for the splitter: a console summary and a JSON file.

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::SplitConfig;
use crate::core::analysis::SplitOutcome;
use crate::core::dataset::{DatasetSplit, RegionDistribution};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub split: DatasetSplit,
    pub rows: usize,
    pub regions: RegionDistribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub seed: u64,
    pub test_fraction: f64,
    pub val_fraction: f64,
    pub total_rows: usize,
    pub splits: Vec<SplitSummary>,
}

impl SplitReport {
    pub fn from_outcome(outcome: &SplitOutcome, config: &SplitConfig) -> Result<Self> {
        let splits = DatasetSplit::all()
            .into_iter()
            .map(|split| -> Result<SplitSummary> {
                let table = outcome.get(split);
                Ok(SplitSummary {
                    split,
                    rows: table.len(),
                    regions: table.region_counts()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            seed: config.seed,
            test_fraction: config.test_fraction,
            val_fraction: config.val_fraction,
            total_rows: outcome.total_rows(),
            splits,
        })
    }

    pub fn get(&self, split: DatasetSplit) -> Option<&SplitSummary> {
        self.splits.iter().find(|summary| summary.split == split)
    }

    fn rows(&self, split: DatasetSplit) -> usize {
        self.get(split).map(|summary| summary.rows).unwrap_or(0)
    }

    /// Human-readable sizes plus the training split's region distribution
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Sizes: Train: {}, Val: {}, Test: {}",
            self.rows(DatasetSplit::Train),
            self.rows(DatasetSplit::Val),
            self.rows(DatasetSplit::Test)
        );
        let _ = writeln!(out, "Region distribution in train:");
        if let Some(train) = self.get(DatasetSplit::Train) {
            for (region, count) in train.regions.by_count_desc() {
                let _ = writeln!(
                    out,
                    "  {:<20} {:>6}  ({:.1}%)",
                    region,
                    count,
                    train.regions.percentage(region)
                );
            }
        }
        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Split report saved to: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::split_dataset;
    use crate::core::dataset::Table;

    fn report() -> SplitReport {
        let rows = (0..120)
            .map(|i| vec![i.to_string(), ["A", "B", "C"][i % 3].to_string()])
            .collect();
        let table = Table::new(vec!["id".into(), "region".into()], rows);
        let config = SplitConfig::default();
        let outcome = split_dataset(&table, &config).unwrap();
        SplitReport::from_outcome(&outcome, &config).unwrap()
    }

    #[test]
    fn test_summary_lists_sizes_and_train_regions() {
        let summary = report().render_summary();
        assert!(summary.starts_with("Sizes: Train: 96, Val: 12, Test: 12\n"));
        assert!(summary.contains("Region distribution in train:"));
        assert!(summary.contains("(33.3%)"));
    }

    #[test]
    fn test_json_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split_report.json");
        report().write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["total_rows"], 120);
        assert_eq!(value["splits"][0]["split"], "train");
        assert_eq!(value["splits"][2]["regions"]["B"], 4);
    }
}
