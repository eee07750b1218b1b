//! Per-row field validation
//!
//! Every rule runs on every row so a rejected row reports all of its
//! problems at once, joined with `"; "`.

use super::{CandidateRow, ValidatedBook};

/// Longest accepted title or author, in characters
pub const MAX_FIELD_LENGTH: usize = 255;

/// Earliest accepted published year for imported rows
pub const MIN_IMPORT_YEAR: i64 = 1000;

pub const INVALID_YEAR_MESSAGE: &str = "Published year must be a valid number";

/// Validate one candidate row against `current_year`
///
/// On success title and author are trimmed and the year is parsed. On
/// failure the joined rule messages are returned.
pub fn validate_row(row: &CandidateRow, current_year: i32) -> Result<ValidatedBook, String> {
    let mut errors: Vec<String> = Vec::new();

    if let Some(message) = check_text_field("Title", &row.title) {
        errors.push(message);
    }
    if let Some(message) = check_text_field("Author", &row.author) {
        errors.push(message);
    }

    let published_year = match parse_leading_integer(&row.published_year) {
        None => {
            errors.push(INVALID_YEAR_MESSAGE.to_string());
            None
        }
        Some(year) if year < MIN_IMPORT_YEAR || year > i64::from(current_year) => {
            errors.push(year_range_message(current_year));
            None
        }
        Some(year) => i32::try_from(year).ok(),
    };

    match published_year {
        Some(published_year) if errors.is_empty() => Ok(ValidatedBook {
            title: row.title.trim().to_string(),
            author: row.author.trim().to_string(),
            published_year,
        }),
        _ => Err(errors.join("; ")),
    }
}

/// Range message for imported years
pub fn year_range_message(current_year: i32) -> String {
    format!(
        "Published year must be between {} and {}",
        MIN_IMPORT_YEAR, current_year
    )
}

fn check_text_field(label: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{} is required", label))
    } else if value.chars().count() > MAX_FIELD_LENGTH {
        Some(format!(
            "{} must not exceed {} characters",
            label, MAX_FIELD_LENGTH
        ))
    } else {
        None
    }
}

/// Parse the leading base-10 integer of `raw`
///
/// Accepts an optional sign followed by at least one digit; anything after
/// the digits is ignored (`"1965abc"` is 1965). Values too large for `i64`
/// saturate, which keeps them out of range rather than unparseable.
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'))
    });

    Some(if negative { -magnitude } else { magnitude })
}
