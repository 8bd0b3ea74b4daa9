pub mod aggregate;
pub mod args;
pub mod config;
pub mod errors;
pub mod extract;
pub mod history;
pub mod rank;
pub mod report;
pub mod schedule;
pub mod snapshot;
pub mod stats;
pub mod utils;

pub use aggregate::{aggregate_domains, aggregate_urls, Bucket, BucketMap, DomainAggregation};
pub use args::Args;
pub use config::{Config, SmtpSettings};
pub use errors::{ExtractorError, Result};
pub use extract::{extract_report, run, Delivery};
pub use history::{DateWindow, HistoryDb, VisitRecord};
pub use rank::{rank, top_n, RankedEntry, TOP_URL_LIMIT};
pub use stats::ExtractionReport;
