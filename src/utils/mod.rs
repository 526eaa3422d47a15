//!
//! Utility module for statement handling.
//!
//! Re-exports date parsing and text normalization helpers used by the reconciler and the sinks.
/// Day-first date and date-time parsing
pub mod dates;
/// Payer name extraction and casing
pub mod text;

pub use dates::{parse_day_first_date, parse_day_first_datetime};
pub use text::extract_sender;
