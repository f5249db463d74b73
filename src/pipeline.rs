//! File-level run units.
//!
//! Each run reads its input table, applies the pure transformations from
//! [`crate::core::analysis`], and only writes outputs once the whole
//! transformation has succeeded.

use tracing::{info, info_span, warn};

use crate::config::PipelineConfig;
use crate::core::analysis::{balance_by_region, label_regions, split_dataset, BalanceSummary};
use crate::core::dataset::{read_tsv, stage_tsv, write_tsv, DatasetSplit};
use crate::error::Result;
use crate::report::SplitReport;

/// Label the input by region, balance it, and write the balanced table
pub fn run_balancer(config: &PipelineConfig) -> Result<BalanceSummary> {
    let _span = info_span!("balance_by_region").entered();

    let table = read_tsv(&config.input_path)?;
    let labeled = label_regions(&table, &config.region_map, config.unmapped_policy)?;
    let outcome = balance_by_region(&labeled.table, config.seed)?;
    let summary = outcome.summary;

    for (region, count) in summary.counts_before.iter() {
        info!("Region '{}': {} rows before balancing", region, count);
    }

    if summary.is_degenerate(config.small_region_warning) {
        warn!(
            "Region '{}' has only {} rows; balancing keeps {} of {} labeled rows ({:.1}%)",
            summary.limiting_region,
            summary.min_count,
            summary.rows_kept,
            summary.rows_kept + summary.rows_discarded,
            summary.kept_fraction() * 100.0
        );
    }

    write_tsv(&outcome.table, &config.balanced_path)?;
    info!(
        "Balanced dataset: {} regions x {} rows = {} rows",
        summary.counts_before.num_regions(),
        summary.min_count,
        summary.rows_kept
    );

    Ok(summary)
}

/// Split the balanced table into train/val/test and write all three.
///
/// All three tables are staged before any of them replaces its target, so
/// a failed write leaves the previous train/val/test files together.
pub fn run_splitter(config: &PipelineConfig) -> Result<SplitReport> {
    let _span = info_span!("split_dataset").entered();

    let table = read_tsv(&config.balanced_path)?;
    let outcome = split_dataset(&table, &config.split)?;
    let report = SplitReport::from_outcome(&outcome, &config.split)?;

    let staged = DatasetSplit::all()
        .into_iter()
        .map(|split| {
            let path = match split {
                DatasetSplit::Train => &config.train_path,
                DatasetSplit::Val => &config.val_path,
                DatasetSplit::Test => &config.test_path,
            };
            stage_tsv(outcome.get(split), path)
        })
        .collect::<Result<Vec<_>>>()?;

    for file in staged {
        file.commit()?;
    }

    report.write_json(&config.report_path)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnmappedPolicy;
    use crate::error::PipelineError;
    use std::collections::HashSet;
    use std::fs;

    fn write_input(config: &PipelineConfig, counts: &[(&str, usize)]) {
        let mut text = String::from("text\tcondition\n");
        let mut id = 0;
        for (code, n) in counts {
            for _ in 0..*n {
                text.push_str(&format!("sample {}\t{}\n", id, code));
                id += 1;
            }
        }
        fs::write(&config.input_path, text).unwrap();
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        // South America 100, North America 40, Central America 200
        write_input(&config, &[("AR", 60), ("CL", 40), ("US", 40), ("GT", 200)]);

        let summary = run_balancer(&config).unwrap();
        assert_eq!(summary.min_count, 40);
        assert_eq!(summary.limiting_region, "North America");

        let balanced = read_tsv(&config.balanced_path).unwrap();
        assert_eq!(balanced.columns(), &["text", "condition", "region"]);
        assert_eq!(balanced.len(), 120);

        let report = run_splitter(&config).unwrap();
        assert_eq!(report.total_rows, 120);

        let train = read_tsv(&config.train_path).unwrap();
        let val = read_tsv(&config.val_path).unwrap();
        let test = read_tsv(&config.test_path).unwrap();
        assert_eq!((train.len(), val.len(), test.len()), (96, 12, 12));

        let all: HashSet<Vec<String>> = train
            .rows()
            .iter()
            .chain(val.rows())
            .chain(test.rows())
            .cloned()
            .collect();
        let expected: HashSet<Vec<String>> = balanced.rows().iter().cloned().collect();
        assert_eq!(all, expected);
        assert!(config.report_path.exists());
    }

    #[test]
    fn test_balancer_is_reproducible_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        write_input(&config, &[("AR", 30), ("US", 12), ("ES", 25)]);

        run_balancer(&config).unwrap();
        let first = fs::read_to_string(&config.balanced_path).unwrap();
        run_balancer(&config).unwrap();
        let second = fs::read_to_string(&config.balanced_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_split_leaves_outputs_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        write_input(&config, &[("AR", 5), ("US", 1)]);
        fs::write(&config.train_path, "previous\n").unwrap();

        run_balancer(&config).unwrap();
        let err = run_splitter(&config).unwrap_err();
        assert!(matches!(err, PipelineError::StratificationInfeasible { .. }));
        assert_eq!(fs::read_to_string(&config.train_path).unwrap(), "previous\n");
    }

    #[test]
    fn test_unwritable_val_keeps_previous_train() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        write_input(&config, &[("AR", 40), ("US", 40), ("ES", 40)]);
        run_balancer(&config).unwrap();

        fs::write(&config.train_path, "previous\n").unwrap();
        fs::write(&config.test_path, "previous\n").unwrap();
        fs::create_dir(&config.val_path).unwrap();

        let err = run_splitter(&config).unwrap_err();
        assert!(matches!(err, PipelineError::Io { ref path, .. } if path == &config.val_path));
        assert_eq!(fs::read_to_string(&config.train_path).unwrap(), "previous\n");
        assert_eq!(fs::read_to_string(&config.test_path).unwrap(), "previous\n");
        assert!(!config.report_path.exists());
    }

    #[test]
    fn test_quoted_input_fields_survive_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        let mut text = String::from("text\tcondition\n");
        for i in 0..20 {
            text.push_str(&format!("\"col\tumn {}\"\tAR\n", i));
            text.push_str(&format!("plain {}\tUS\n", i));
        }
        fs::write(&config.input_path, text).unwrap();

        let summary = run_balancer(&config).unwrap();
        assert_eq!(summary.rows_kept, 40);

        let balanced = read_tsv(&config.balanced_path).unwrap();
        assert!(balanced.rows().iter().any(|row| row[0] == "col\tumn 3"));
        assert_eq!(balanced.columns(), &["text", "condition", "region"]);
    }

    #[test]
    fn test_fail_policy_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            unmapped_policy: UnmappedPolicy::Fail,
            ..PipelineConfig::in_dir(dir.path())
        };
        write_input(&config, &[("AR", 5), ("FR", 1)]);

        assert!(matches!(
            run_balancer(&config),
            Err(PipelineError::UnmappedCondition { .. })
        ));
        assert!(!config.balanced_path.exists());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        assert!(run_balancer(&config).is_err());
    }
}
