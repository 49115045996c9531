//! Positional row parsing
//!
//! Every import kind declares its column layout as a serde struct whose
//! fields are listed in column order. A row is checked for width, trimmed,
//! cut to the declared width, and deserialized into that struct.

use csv::StringRecord;
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::csv_reader::CsvRow;

/// Problems with the content of a single row
#[derive(Debug, Error, Diagnostic)]
pub enum RowError {
    #[error("row has {found} column(s), expected at least {expected}")]
    #[diagnostic(
        code(nutri::row::too_short),
        help("check the column layout for this import kind with `nutri import --help`")
    )]
    TooShort { expected: usize, found: usize },

    #[error("row could not be read: {0}")]
    #[diagnostic(code(nutri::row::invalid))]
    Invalid(String),

    #[error("{axis} code '{code}' is too short to carry its level digits")]
    #[diagnostic(code(nutri::row::malformed_code))]
    MalformedCode { axis: &'static str, code: String },

    #[error("row has no food group, major category or minor category code")]
    #[diagnostic(code(nutri::row::no_classification))]
    NoClassification,
}

/// Deserialize the first `width` columns of a row into `T`
///
/// Columns beyond `width` are ignored.
pub fn parse_positional<T: DeserializeOwned>(row: &CsvRow, width: usize) -> Result<T, RowError> {
    if row.len() < width {
        return Err(RowError::TooShort {
            expected: width,
            found: row.len(),
        });
    }

    let trimmed: StringRecord = row.fields.iter().take(width).map(str::trim).collect();
    trimmed
        .deserialize(None)
        .map_err(|e| RowError::Invalid(e.to_string()))
}
