//! CSV file reading
//!
//! Rows are returned exactly as they appear in the file: no header row is
//! recognised and rows may differ in width. Column layout is enforced later
//! by the row schema of each import kind.

use csv::{ReaderBuilder, StringRecord};
use miette::Diagnostic;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One parsed CSV row with its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub line: u64,
    pub fields: StringRecord,
}

impl CsvRow {
    pub fn new(line: u64, fields: &[&str]) -> Self {
        Self {
            line,
            fields: StringRecord::from(fields.to_vec()),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx)
    }
}

/// Errors raised while reading a CSV file
#[derive(Debug, Error, Diagnostic)]
pub enum CsvReadError {
    #[error("the file {} does not exist", .0.display())]
    #[diagnostic(code(nutri::csv::not_found), help("check the path passed to the command"))]
    NotFound(PathBuf),

    #[error("cannot open the file {}", .path.display())]
    #[diagnostic(code(nutri::csv::open))]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} at line {line}", .path.display())]
    #[diagnostic(code(nutri::csv::parse))]
    Parse {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Read every row of a comma-delimited file
///
/// The file is closed when this returns, whether or not parsing succeeded.
pub fn read_rows(path: &Path) -> Result<Vec<CsvRow>, CsvReadError> {
    if !path.exists() {
        return Err(CsvReadError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CsvReadError::Open {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let file = File::open(path).map_err(|source| CsvReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "opened csv file");

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|source| CsvReadError::Parse {
            path: path.to_path_buf(),
            line: source
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 1),
            source,
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 1);
        rows.push(CsvRow {
            line,
            fields: record,
        });
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read csv file");
    Ok(rows)
}
