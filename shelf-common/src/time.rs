//! Timestamp utilities

use chrono::{DateTime, Datelike, Local, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current calendar year in local time
///
/// Upper bound for published-year validation. Callers pass the result down
/// explicitly so validation never reads the wall clock itself.
pub fn current_year() -> i32 {
    Local::now().year()
}
