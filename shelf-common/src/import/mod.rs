//! CSV book import pipeline
//!
//! Turns an uploaded CSV buffer into validated book rows plus per-row
//! rejections. Structural problems (no data rows, missing header columns)
//! fail the whole import; row problems are collected and never abort it.
//!
//! # Input format
//!
//! ```text
//! title,author,publishedyear
//! Dune,Frank Herbert,1965
//! ```
//!
//! Header names are case-insensitive and may appear in any order alongside
//! extra columns. Line numbers are 1-based with the header on line 1.

mod header;
mod validate;

pub use header::{HeaderIndex, REQUIRED_COLUMNS};
pub use validate::{validate_row, year_range_message, INVALID_YEAR_MESSAGE, MAX_FIELD_LENGTH, MIN_IMPORT_YEAR};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Structural import failures, raised before any row is processed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("CSV file must contain header and at least one data row")]
    MalformedInput,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Raw field values from one data line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    /// 1-based source line (header is line 1)
    #[serde(skip)]
    pub line: usize,
    pub title: String,
    pub author: String,
    pub published_year: String,
}

/// Book row that passed every field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedBook {
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

/// Rejected row with every failing rule's message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub data: CandidateRow,
    pub error: String,
}

/// Outcome of one import: accepted rows and rejected rows in line order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub data: Vec<ValidatedBook>,
    pub errors: Vec<RowError>,
}

/// Parse and validate a CSV buffer
///
/// Pure: the same buffer and `current_year` always produce the same result.
pub fn parse_csv(buffer: &[u8], current_year: i32) -> Result<ImportResult, ImportError> {
    let text = String::from_utf8_lossy(buffer);
    let lines: Vec<&str> = trim_text(&text).split('\n').collect();

    if lines.len() < 2 {
        return Err(ImportError::MalformedInput);
    }

    let header = HeaderIndex::from_header_line(lines[0])?;
    let mut result = ImportResult::default();

    for (index, line) in lines.iter().enumerate().skip(1) {
        let line_number = index + 1;

        let Some(candidate) = header.extract(line, line_number) else {
            continue;
        };

        match validate_row(&candidate, current_year) {
            Ok(book) => result.data.push(book),
            Err(error) => result.errors.push(RowError {
                row: line_number,
                data: candidate,
                error,
            }),
        }
    }

    debug!(
        "Parsed CSV import: {} lines, {} accepted, {} rejected",
        lines.len() - 1,
        result.data.len(),
        result.errors.len()
    );

    Ok(result)
}

/// Byte-order mark some spreadsheet exports put in front of the header
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Trim whitespace and byte-order marks from both ends
pub(crate) fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
}
