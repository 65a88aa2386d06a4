//! Utility functions for ids and display formatting.

pub mod format;
pub mod ids;

pub use format::{format_date_pretty, format_time_12h, truncate_string};
pub use ids::new_id;
