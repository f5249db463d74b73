//! Stratified train/val/test splitting.
//!
//! Every split is carved per region, so each region contributes to a split
//! in proportion to its share of the input. Per-region counts are rounded
//! with the largest-remainder method, which keeps each region within one row
//! of its exact share while hitting the requested split size exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::config::SplitConfig;
use crate::core::dataset::{DatasetSplit, Table, REGION_COLUMN};
use crate::error::{PipelineError, Result};

/// Slack for float products that should land on an integer (0.1/0.9 * 108)
const ROUNDING_EPSILON: f64 = 1e-9;

/// The three disjoint parts of a split dataset
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub train: Table,
    pub val: Table,
    pub test: Table,
}

impl SplitOutcome {
    pub fn get(&self, split: DatasetSplit) -> &Table {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
            DatasetSplit::Test => &self.test,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Return a new table with all rows in seeded random order
pub fn shuffle_rows(table: &Table, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.shuffle(&mut rng);
    table.select(&order)
}

/// Number of rows held out for a fraction, rounded up
fn held_out_size(fraction: f64, total: usize) -> usize {
    let exact = fraction * total as f64;
    ((exact - ROUNDING_EPSILON).ceil().max(0.0) as usize).min(total)
}

/// Distribute `target` rows across groups of `sizes` proportionally.
///
/// Each group first gets the floor of its exact share; the rows still owed
/// go one each to the groups with the largest fractional remainders, ties
/// to the earlier group.
pub fn allocate_proportionally(sizes: &[usize], target: usize) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    if total == 0 {
        return vec![0; sizes.len()];
    }

    let exact: Vec<f64> = sizes
        .iter()
        .map(|&size| target as f64 * size as f64 / total as f64)
        .collect();
    let mut allocation: Vec<usize> = exact
        .iter()
        .zip(sizes)
        .map(|(&share, &size)| ((share + ROUNDING_EPSILON).floor() as usize).min(size))
        .collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let rem_a = exact[a] - allocation[a] as f64;
        let rem_b = exact[b] - allocation[b] as f64;
        rem_b.total_cmp(&rem_a).then_with(|| a.cmp(&b))
    });

    let mut owed = target.saturating_sub(allocation.iter().sum());
    for &group in order.iter().cycle().take(sizes.len() * 2) {
        if owed == 0 {
            break;
        }
        if allocation[group] < sizes[group] {
            allocation[group] += 1;
            owed -= 1;
        }
    }

    allocation
}

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidFraction { name, value })
    }
}

/// Split `table` into `(rest, held_out)` stratified on `region`.
///
/// `held_out` receives `ceil(fraction * len)` rows, shared across regions in
/// proportion to their size. Fails if any region cannot put at least one row
/// on each side.
pub fn stratified_split(table: &Table, fraction: f64, seed: u64) -> Result<(Table, Table)> {
    check_fraction("held-out fraction", fraction)?;

    let region_idx = table.require_column(REGION_COLUMN)?;
    if table.is_empty() {
        return Err(PipelineError::EmptyDataset("no rows to split".to_string()));
    }

    let groups = table.group_indices(region_idx);
    let n_held = held_out_size(fraction, table.len());
    let n_rest = table.len() - n_held;

    for (region, indices) in &groups {
        if indices.len() < 2 {
            error!("Region '{}' has {} row(s); cannot stratify", region, indices.len());
            return Err(PipelineError::StratificationInfeasible {
                region: region.to_string(),
                rows: indices.len(),
                reason: "at least 2 rows are needed to appear on both sides of a split"
                    .to_string(),
            });
        }
    }

    if n_held < groups.len() || n_rest < groups.len() {
        let (region, indices) = groups
            .iter()
            .min_by_key(|(_, indices)| indices.len())
            .map(|(region, indices)| (region.to_string(), indices.len()))
            .unwrap_or_default();
        error!(
            "Split of {} rows into {}/{} cannot cover {} regions",
            table.len(),
            n_rest,
            n_held,
            groups.len()
        );
        return Err(PipelineError::StratificationInfeasible {
            region,
            rows: indices,
            reason: format!(
                "a split of {} + {} rows cannot hold every one of {} regions",
                n_rest,
                n_held,
                groups.len()
            ),
        });
    }

    let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
    let held_counts = allocate_proportionally(&sizes, n_held);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rest = Vec::with_capacity(n_rest);
    let mut held_out = Vec::with_capacity(n_held);

    for ((region, indices), &n_region_held) in groups.iter().zip(&held_counts) {
        if n_region_held == 0 || n_region_held == indices.len() {
            error!(
                "Region '{}' would get {} of {} rows held out",
                region,
                n_region_held,
                indices.len()
            );
            return Err(PipelineError::StratificationInfeasible {
                region: region.to_string(),
                rows: indices.len(),
                reason: format!(
                    "proportional allocation leaves one side empty ({} of {} held out)",
                    n_region_held,
                    indices.len()
                ),
            });
        }

        let mut permuted = indices.clone();
        permuted.shuffle(&mut rng);
        let (held, kept) = permuted.split_at(n_region_held);
        held_out.extend_from_slice(held);
        rest.extend_from_slice(kept);

        debug!(
            "Region '{}': {} rows kept, {} held out",
            region,
            kept.len(),
            held.len()
        );
    }

    rest.shuffle(&mut rng);
    held_out.shuffle(&mut rng);

    Ok((table.select(&rest), table.select(&held_out)))
}

/// Shuffle, carve off test, then carve val out of the remainder.
///
/// Val is sized so it holds `val_fraction` of the full table, not of the
/// remainder.
pub fn split_dataset(table: &Table, config: &SplitConfig) -> Result<SplitOutcome> {
    check_fraction("test fraction", config.test_fraction)?;
    check_fraction("val fraction", config.val_fraction)?;
    if config.test_fraction + config.val_fraction >= 1.0 {
        return Err(PipelineError::FractionsTooLarge {
            test: config.test_fraction,
            val: config.val_fraction,
        });
    }

    let shuffled = shuffle_rows(table, config.seed);

    let (train_val, test) = stratified_split(&shuffled, config.test_fraction, config.seed)?;
    let val_frac = config.val_fraction_of_remainder();
    debug!("Val fraction of remainder: {:.4}", val_frac);
    let (train, val) = stratified_split(&train_val, val_frac, config.seed)?;

    info!(
        "Split {} rows into train {}, val {}, test {}",
        table.len(),
        train.len(),
        val.len(),
        test.len()
    );

    Ok(SplitOutcome { train, val, test })
}
