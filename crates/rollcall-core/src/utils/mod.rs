//! Utility functions for string formatting and parsing.

pub mod format;

pub use format::{format_rate, parse_grade_section, strip_whitespace};
