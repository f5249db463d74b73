//! In-memory tabular dataset.
//!
//! A [`Table`] is an immutable value: every transformation in the pipeline
//! takes a table by reference and returns a new one.

use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};

use super::RegionDistribution;

/// Column holding the country/territory code
pub const CONDITION_COLUMN: &str = "condition";
/// Column added by the region labeler
pub const REGION_COLUMN: &str = "region";

/// One row of string fields, aligned with the table's columns
pub type Record = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Like [`Table::column_index`] but a missing column is an error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Return a new table with `name` set to `values`, one per row.
    ///
    /// An existing column of the same name is overwritten in place;
    /// otherwise the column is appended.
    pub fn with_column(&self, name: &str, values: Vec<String>) -> Table {
        debug_assert_eq!(values.len(), self.rows.len());

        let existing = self.column_index(name);
        let mut columns = self.columns.clone();
        if existing.is_none() {
            columns.push(name.to_string());
        }

        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                match existing {
                    Some(idx) => row[idx] = value,
                    None => row.push(value),
                }
                row
            })
            .collect();

        Table { columns, rows }
    }

    /// Return a new table holding the rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&idx| self.rows[idx].clone()).collect(),
        }
    }

    /// Row indices grouped by the value of column `column`, keyed in sorted order
    pub fn group_indices(&self, column: usize) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, row) in self.rows.iter().enumerate() {
            groups.entry(row[column].as_str()).or_default().push(idx);
        }
        groups
    }

    /// Count rows per value of the `region` column
    pub fn region_counts(&self) -> Result<RegionDistribution> {
        let region_idx = self.require_column(REGION_COLUMN)?;
        Ok(RegionDistribution::from_values(
            self.rows.iter().map(|row| row[region_idx].as_str()),
        ))
    }
}
