//! # Shelf Common Library
//!
//! Shared code for the Shelf book service including:
//! - CSV import pipeline (row parsing, validation, partial-failure reporting)
//! - Bootstrap configuration loading
//! - Error types
//! - Clock utilities

pub mod config;
pub mod error;
pub mod import;
pub mod time;

pub use error::{Error, Result};
pub use import::{parse_csv, validate_row, ImportError, ImportResult, ValidatedBook};
