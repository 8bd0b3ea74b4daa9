//! Output sinks for an [`ExtractionReport`](crate::stats::ExtractionReport).

pub mod csv;
pub mod email;
pub mod table;

/// Column labels shared by the terminal tables and the CSV files.
pub const HEADER: [&str; 3] = ["URL", "Count", "Last Visited"];
