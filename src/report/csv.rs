use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::Result;
use crate::rank::RankedEntry;
use crate::report::HEADER;
use crate::stats::ExtractionReport;

pub const DOMAINS_FILE: &str = "domains.csv";
pub const MAIL_FILE: &str = "mail_to_domains.csv";
pub const TOP_URLS_FILE: &str = "top_100_urls.csv";

/// Write a header row plus one row per entry. Keys are written in full.
pub fn write_report(entries: &[RankedEntry], path: &Path) -> Result<()> {
    // Header written by hand so an empty report still gets one.
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    info!(action = "write", component = "csv_report", path = ?path, rows = entries.len(), "CSV report written");
    Ok(())
}

/// Write the three report files into `dir` and return their paths in
/// attachment order.
pub fn write_all(report: &ExtractionReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let files = [
        (DOMAINS_FILE, &report.domains),
        (MAIL_FILE, &report.mail),
        (TOP_URLS_FILE, &report.top_urls),
    ];

    let mut paths = Vec::with_capacity(files.len());
    for (name, entries) in files {
        let path = dir.join(name);
        write_report(entries, &path)?;
        paths.push(path);
    }
    Ok(paths)
}
