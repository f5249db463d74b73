use serde::Serialize;
use std::path::PathBuf;

use super::RegionMap;

/// What to do with rows whose `condition` has no entry in the region map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnmappedPolicy {
    /// Drop the rows and log each unmapped code
    #[default]
    Drop,
    /// Abort on the first unmapped code
    Fail,
    /// Keep the rows under an explicit region
    Group,
}

impl UnmappedPolicy {
    /// Region name used for unmapped rows under [`UnmappedPolicy::Group`]
    pub const UNMAPPED_REGION: &'static str = "Unmapped";

    pub fn as_str(&self) -> &str {
        match self {
            UnmappedPolicy::Drop => "drop",
            UnmappedPolicy::Fail => "fail",
            UnmappedPolicy::Group => "group",
        }
    }
}

/// Fractions of the full dataset held out for test and validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitConfig {
    pub test_fraction: f64, // 0.10 for 10%
    pub val_fraction: f64,  // 0.10 of the full set, not of the remainder
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.10,
            val_fraction: 0.10,
            seed: PipelineConfig::DEFAULT_SEED,
        }
    }
}

impl SplitConfig {
    /// Fraction of the train+val remainder that must go to val so that val
    /// ends up holding `val_fraction` of the full set
    pub fn val_fraction_of_remainder(&self) -> f64 {
        self.val_fraction / (1.0 - self.test_fraction)
    }
}

/// Pipeline configuration containing all fixed values
///
/// Both run units build this with `PipelineConfig::default()`; nothing is
/// read from flags or the environment.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub balanced_path: PathBuf,
    pub train_path: PathBuf,
    pub val_path: PathBuf,
    pub test_path: PathBuf,
    pub report_path: PathBuf,
    pub seed: u64,
    pub split: SplitConfig,
    pub unmapped_policy: UnmappedPolicy,
    /// Warn when balancing shrinks every region below this many rows
    pub small_region_warning: usize,
    #[serde(skip)]
    pub region_map: RegionMap,
}

impl PipelineConfig {
    pub const DEFAULT_SEED: u64 = 42;

    /// Same configuration with every file placed under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let defaults = Self::default();
        Self {
            input_path: dir.join(&defaults.input_path),
            balanced_path: dir.join(&defaults.balanced_path),
            train_path: dir.join(&defaults.train_path),
            val_path: dir.join(&defaults.val_path),
            test_path: dir.join(&defaults.test_path),
            report_path: dir.join(&defaults.report_path),
            ..defaults
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("balanced_by_country_dataset.tsv"),
            balanced_path: PathBuf::from("balanced_by_region.tsv"),
            train_path: PathBuf::from("train.tsv"),
            val_path: PathBuf::from("val.tsv"),
            test_path: PathBuf::from("test.tsv"),
            report_path: PathBuf::from("split_report.json"),
            seed: Self::DEFAULT_SEED,
            split: SplitConfig::default(),
            unmapped_policy: UnmappedPolicy::default(),
            small_region_warning: 10,
            region_map: RegionMap::default(),
        }
    }
}
