//! Tab-separated file I/O.
//!
//! Files carry a header row; every data row must have exactly as many fields
//! as the header, otherwise the read fails. Fields holding a tab, quote or
//! newline are double-quoted, as pandas writes them.
//!
//! Writes go through [`StagedTsv`]: the table is written to a temporary file
//! beside the target and only renamed over it on [`StagedTsv::commit`], so a
//! run can stage every output before replacing any of them.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::Table;
use crate::error::{PipelineError, Result};

pub fn read_tsv(path: &Path) -> Result<Table> {
    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    info!("Read {} rows x {} columns from {:?}", rows.len(), columns.len(), path);
    debug!("Columns: {:?}", columns);

    Ok(Table::new(columns, rows))
}

/// A fully written table waiting to replace its target file
#[derive(Debug)]
pub struct StagedTsv {
    file: NamedTempFile,
    target: PathBuf,
    rows: usize,
}

impl StagedTsv {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over the target
    pub fn commit(self) -> Result<()> {
        let StagedTsv { file, target, rows } = self;
        file.persist(&target).map_err(|err| PipelineError::Io {
            path: target.clone(),
            source: err.error,
        })?;
        info!("Wrote {} rows to {:?}", rows, target);
        Ok(())
    }
}

/// Write `table` to a temporary file in the target's directory
pub fn stage_tsv(table: &Table, path: &Path) -> Result<StagedTsv> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let write_err = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if path.is_dir() {
        return Err(io_err(io::Error::new(
            io::ErrorKind::Other,
            "output path is a directory",
        )));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer::<&mut File>(file.as_file_mut());

        writer.write_record(table.columns()).map_err(write_err)?;
        for row in table.rows() {
            writer.write_record(row).map_err(write_err)?;
        }
        writer.flush().map_err(io_err)?;
    }

    debug!("Staged {} rows for {:?} at {:?}", table.len(), path, file.path());
    Ok(StagedTsv {
        file,
        target: path.to_path_buf(),
        rows: table.len(),
    })
}

/// Stage then commit a single table
pub fn write_tsv(table: &Table, path: &Path) -> Result<()> {
    stage_tsv(table, path)?.commit()
}
