//! Region labeling and balancing.
//!
//! Each record gets a `region` derived from its `condition` code, then every
//! region is downsampled to the size of the smallest one so all regions are
//! equally represented. A tiny minority region shrinks every other region
//! with it; that is the point of the exercise and is reported, not avoided.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use crate::config::{RegionMap, UnmappedPolicy};
use crate::core::dataset::{RegionDistribution, Table, CONDITION_COLUMN, REGION_COLUMN};
use crate::error::{PipelineError, Result};

/// Table with a `region` column, plus the codes that had no mapping
#[derive(Debug, Clone)]
pub struct LabeledTable {
    pub table: Table,
    /// Unmapped condition code -> number of rows carrying it
    pub unmapped: BTreeMap<String, usize>,
}

impl LabeledTable {
    pub fn unmapped_rows(&self) -> usize {
        self.unmapped.values().sum()
    }
}

/// What balancing did to the dataset
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    /// Per-region row counts before downsampling
    pub counts_before: RegionDistribution,
    /// Rows kept per region
    pub min_count: usize,
    /// Region whose size set `min_count`
    pub limiting_region: String,
    pub rows_kept: usize,
    pub rows_discarded: usize,
}

impl BalanceSummary {
    /// Fraction of labeled rows that survived balancing
    pub fn kept_fraction(&self) -> f64 {
        let total = self.rows_kept + self.rows_discarded;
        if total == 0 {
            return 0.0;
        }
        self.rows_kept as f64 / total as f64
    }

    /// True when balancing shrank every region below `small_region_warning`
    /// rows or threw away more than half of the data
    pub fn is_degenerate(&self, small_region_warning: usize) -> bool {
        self.min_count < small_region_warning || self.kept_fraction() < 0.5
    }
}

#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    pub table: Table,
    pub summary: BalanceSummary,
}

// =============================================================================
// LABELING
// =============================================================================

/// Add a `region` column derived from `condition` through `region_map`.
///
/// Rows whose code is missing from the map are handled per `policy`. The
/// input table is left untouched.
pub fn label_regions(
    table: &Table,
    region_map: &RegionMap,
    policy: UnmappedPolicy,
) -> Result<LabeledTable> {
    let condition_idx = table.require_column(CONDITION_COLUMN)?;

    let mut kept = Vec::with_capacity(table.len());
    let mut regions = Vec::with_capacity(table.len());
    let mut unmapped: BTreeMap<String, usize> = BTreeMap::new();

    for (idx, row) in table.rows().iter().enumerate() {
        let code = &row[condition_idx];
        // Exact match: padded codes fall under the unmapped policy
        let region = match region_map.region_for(code) {
            Some(region) => region,
            None => {
                *unmapped.entry(code.clone()).or_insert(0) += 1;
                match policy {
                    UnmappedPolicy::Drop => continue,
                    UnmappedPolicy::Fail => {
                        error!("Condition {:?} on data row {} has no region", code, idx + 1);
                        return Err(PipelineError::UnmappedCondition {
                            code: code.clone(),
                            row: idx + 1,
                        });
                    }
                    UnmappedPolicy::Group => UnmappedPolicy::UNMAPPED_REGION,
                }
            }
        };
        kept.push(idx);
        regions.push(region.to_string());
    }

    for (code, rows) in &unmapped {
        match policy {
            UnmappedPolicy::Drop => warn!("Dropped {} rows with unmapped condition {:?}", rows, code),
            _ => warn!(
                "Grouped {} rows with unmapped condition {:?} under '{}'",
                rows,
                code,
                UnmappedPolicy::UNMAPPED_REGION
            ),
        }
    }

    let labeled = table.select(&kept).with_column(REGION_COLUMN, regions);
    info!(
        "Labeled {} of {} rows with a region (unmapped policy: {})",
        labeled.len(),
        table.len(),
        policy.as_str()
    );

    Ok(LabeledTable {
        table: labeled,
        unmapped,
    })
}

// =============================================================================
// BALANCING
// =============================================================================

/// Downsample every region to the size of the smallest region.
///
/// Regions are visited in name order and sampled without replacement from a
/// single RNG seeded with `seed`, so the same input and seed always select
/// the same rows. Output rows are grouped by region.
pub fn balance_by_region(table: &Table, seed: u64) -> Result<BalanceOutcome> {
    let region_idx = table.require_column(REGION_COLUMN)?;
    if table.is_empty() {
        return Err(PipelineError::EmptyDataset(
            "no labeled rows to balance".to_string(),
        ));
    }

    let counts_before = table.region_counts()?;
    let (limiting_region, min_count) = counts_before
        .min()
        .map(|(region, count)| (region.to_string(), count))
        .ok_or_else(|| PipelineError::EmptyDataset("no regions found".to_string()))?;

    info!(
        "Balancing {} regions to {} rows each (limited by '{}')",
        counts_before.num_regions(),
        min_count,
        limiting_region
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut selected = Vec::with_capacity(min_count * counts_before.num_regions());

    for (region, indices) in table.group_indices(region_idx) {
        let picks = index::sample(&mut rng, indices.len(), min_count);
        debug!(
            "Region '{}': keeping {} of {} rows",
            region,
            min_count,
            indices.len()
        );
        selected.extend(picks.iter().map(|pick| indices[pick]));
    }

    let balanced = table.select(&selected);
    let summary = BalanceSummary {
        counts_before,
        min_count,
        limiting_region,
        rows_kept: balanced.len(),
        rows_discarded: table.len() - balanced.len(),
    };

    Ok(BalanceOutcome {
        table: balanced,
        summary,
    })
}

/// Label then balance in one step
pub fn label_and_balance(
    table: &Table,
    region_map: &RegionMap,
    policy: UnmappedPolicy,
    seed: u64,
) -> Result<BalanceOutcome> {
    let labeled = label_regions(table, region_map, policy)?;
    balance_by_region(&labeled.table, seed)
}
