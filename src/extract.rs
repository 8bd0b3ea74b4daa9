use chrono::{Local, NaiveDate};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

use crate::aggregate::{self, BucketMap, DomainAggregation};
use crate::config::{Config, SmtpSettings};
use crate::errors::Result;
use crate::history::{DateWindow, HistoryDb};
use crate::rank::{self, TOP_URL_LIMIT};
use crate::report::email::{self, ReportEmail};
use crate::report::{csv, table};
use crate::snapshot;
use crate::stats::ExtractionReport;
use crate::utils;

/// Length of the reporting window, in days before today.
pub const WINDOW_DAYS: u64 = 7;

pub fn default_window(today: NaiveDate) -> DateWindow {
    DateWindow::trailing_days(today, WINDOW_DAYS)
}

/// Snapshot, query, aggregate and rank.
///
/// Returns `Ok(None)` when the history database does not exist: nothing to
/// report, and nothing went wrong.
pub fn extract_report(
    config: &Config,
    window: Option<&DateWindow>,
) -> Result<Option<ExtractionReport>> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "extraction", "Starting browser history extraction");

    let copied = snapshot::copy_history_database(&config.history_path, &config.copy_path);
    let snapshot_path = match copied {
        Ok(path) => path,
        Err(e) if e.is_source_not_found() => {
            error!(action = "copy", component = "database_copy", error = %e, "History database unavailable");
            println!("{}", utils::red(&format!("Error copying history db: {e}")));
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let db = HistoryDb::open(&snapshot_path)?;

    let mut domains = DomainAggregation::default();
    let mut urls = BucketMap::new();
    let mut total_visits = 0u64;
    let rows_read = db.for_each_visit(window, |visit| {
        total_visits += visit.visit_count;
        domains.add(&visit);
        aggregate::add_url(&mut urls, &visit);
    })?;

    db.close()?;

    info!(
        action = "aggregate",
        component = "extraction",
        domains = domains.domains.len(),
        recipients = domains.mail.len(),
        urls = urls.len(),
        visits_dropped = domains.dropped,
        "Aggregation completed"
    );

    let report = ExtractionReport {
        window: window.copied(),
        domains: rank::rank(domains.domains),
        mail: rank::rank(domains.mail),
        top_urls: rank::top_n(urls, TOP_URL_LIMIT),
        rows_read,
        total_visits,
        visits_dropped: domains.dropped,
    };

    let total_time = total_start_time.elapsed();
    info!(action = "complete", component = "extraction", duration_ms = total_time.as_millis(), "Extraction completed successfully");
    Ok(Some(report))
}

/// Where a finished report goes.
#[derive(Debug, Clone)]
pub enum Delivery<'a> {
    Terminal,
    Email {
        settings: &'a SmtpSettings,
        output_dir: &'a Path,
    },
}

impl<'a> Delivery<'a> {
    pub fn choose(settings: Option<&'a SmtpSettings>, output_dir: &'a Path) -> Self {
        match settings {
            Some(settings) => Delivery::Email {
                settings,
                output_dir,
            },
            None => Delivery::Terminal,
        }
    }
}

fn print_summary(report: &ExtractionReport) {
    if let Some(window) = &report.window {
        println!("Date range: {} to {}", window.from, window.to);
    }
    println!(
        "Visits: {} across {} pages ({} without a domain or recipient)",
        utils::format_number(report.total_visits),
        utils::format_number(report.rows_read as u64),
        utils::format_number(report.visits_dropped)
    );
}

/// Extract the trailing week and hand it to the chosen reporter. Returns
/// the report, or `None` when there was no history to read.
pub fn run(config: &Config, delivery: Delivery<'_>) -> Result<Option<ExtractionReport>> {
    let window = default_window(Local::now().date_naive());
    let Some(report) = extract_report(config, Some(&window))? else {
        return Ok(None);
    };

    match delivery {
        Delivery::Terminal => {
            print_summary(&report);
            table::print_report(&report);
        }
        Delivery::Email {
            settings,
            output_dir,
        } => {
            let attachments = csv::write_all(&report, output_dir)?;
            let message = ReportEmail::for_user(&utils::current_user(), attachments);
            email::send_report(settings, &message);
        }
    }

    Ok(Some(report))
}
