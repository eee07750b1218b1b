//! Header resolution and positional field extraction
//!
//! Splitting is naive: a comma always separates fields, quoting is not
//! understood. A field containing a comma shifts every later column.

use super::{trim_text, CandidateRow, ImportError};

pub const TITLE_COLUMN: &str = "title";
pub const AUTHOR_COLUMN: &str = "author";
pub const PUBLISHED_YEAR_COLUMN: &str = "publishedyear";

/// Columns every import header must declare, in reporting order
pub const REQUIRED_COLUMNS: [&str; 3] = [TITLE_COLUMN, AUTHOR_COLUMN, PUBLISHED_YEAR_COLUMN];

/// Column positions of the required fields within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderIndex {
    pub title: usize,
    pub author: usize,
    pub published_year: usize,
}

impl HeaderIndex {
    /// Resolve required columns from the header line
    ///
    /// Names match case-insensitively after trimming; the first occurrence of
    /// a duplicated name wins. Fails with every missing name at once.
    pub fn from_header_line(line: &str) -> Result<Self, ImportError> {
        let tokens: Vec<String> = line
            .split(',')
            .map(|token| trim_text(token).to_lowercase())
            .collect();

        let positions = REQUIRED_COLUMNS.map(|name| tokens.iter().position(|token| token == name));

        match positions {
            [Some(title), Some(author), Some(published_year)] => Ok(Self {
                title,
                author,
                published_year,
            }),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .zip(positions)
                    .filter(|(_, position)| position.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(ImportError::MissingColumns(missing))
            }
        }
    }

    /// Extract the required fields from one data line
    ///
    /// Returns `None` when every value on the line is blank. Columns beyond
    /// the end of a short line read as empty strings.
    pub fn extract(&self, line: &str, line_number: usize) -> Option<CandidateRow> {
        let values: Vec<&str> = line.split(',').map(trim_text).collect();

        if values.iter().all(|value| value.is_empty()) {
            return None;
        }

        let value_at = |index: usize| values.get(index).copied().unwrap_or_default().to_string();

        Some(CandidateRow {
            line: line_number,
            title: value_at(self.title),
            author: value_at(self.author),
            published_year: value_at(self.published_year),
        })
    }
}
