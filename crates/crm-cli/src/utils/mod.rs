//! Utility functions for display formatting.

pub mod format;

pub use format::{format_currency, format_date, format_phone, format_timestamp, or_empty, truncate};
