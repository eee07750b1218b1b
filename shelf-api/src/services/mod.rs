//! Business logic between handlers and storage

pub mod books;

pub use books::BookInput;
