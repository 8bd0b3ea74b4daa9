use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Seconds between 1601-01-01 (the history store's epoch) and 1970-01-01.
pub const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

const MICROS_PER_SEC: i64 = 1_000_000;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const VISITS_QUERY: &str = "SELECT last_visit_time, url, visit_count FROM urls";
const VISITS_IN_WINDOW_QUERY: &str = "SELECT last_visit_time, url, visit_count FROM urls \
     WHERE last_visit_time >= ?1 AND last_visit_time < ?2";

/// One row of the `urls` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub url: String,
    pub visit_count: u64,
}

impl VisitRecord {
    pub fn new(timestamp: impl Into<String>, url: impl Into<String>, visit_count: u64) -> Self {
        Self {
            timestamp: timestamp.into(),
            url: url.into(),
            visit_count,
        }
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The `days` days before `today`, up to and including `today`.
    pub fn trailing_days(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// Store timestamps for `[from 00:00, to + 1 day 00:00)`.
    fn webkit_bounds(&self) -> (i64, i64) {
        let lower = datetime_to_webkit(self.from.and_hms_opt(0, 0, 0).unwrap_or_default());
        let upper = self
            .to
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(datetime_to_webkit)
            .unwrap_or(i64::MAX);
        (lower, upper)
    }
}

/// Convert store microseconds to a UTC datetime, truncated to whole seconds.
pub fn webkit_to_datetime(micros: i64) -> Option<NaiveDateTime> {
    let unix_secs = micros / MICROS_PER_SEC - WEBKIT_EPOCH_OFFSET_SECS;
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.naive_utc())
}

pub fn datetime_to_webkit(datetime: NaiveDateTime) -> i64 {
    (datetime.and_utc().timestamp() + WEBKIT_EPOCH_OFFSET_SECS) * MICROS_PER_SEC
}

pub fn format_webkit_timestamp(micros: i64) -> String {
    webkit_to_datetime(micros)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Open connection to a history snapshot.
///
/// The connection lives exactly as long as this guard. `close` commits
/// explicitly and surfaces errors; dropping the guard on any other path
/// commits whatever is pending and releases the handle.
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(action = "open", component = "history_db", path = ?path, "Connected to database");
        Ok(Self { conn })
    }

    /// Wrap an existing connection, e.g. an in-memory database.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Stream every visit in `window` (or all visits when `None`) to `f`, in
    /// the store's natural row order. Returns how many rows were visited.
    pub fn for_each_visit<F>(&self, window: Option<&DateWindow>, mut f: F) -> Result<usize>
    where
        F: FnMut(VisitRecord),
    {
        let start_time = Instant::now();
        info!(action = "start", component = "history_query", window = ?window, "Querying visit history");

        let conn = &self.conn;
        let mut rows_seen = 0usize;

        let mut handle = |row: &rusqlite::Row<'_>| -> rusqlite::Result<()> {
            let last_visit_time: i64 = row.get(0)?;
            let url: String = row.get(1)?;
            let visit_count: i64 = row.get(2)?;
            rows_seen += 1;
            f(VisitRecord {
                timestamp: format_webkit_timestamp(last_visit_time),
                url,
                visit_count: u64::try_from(visit_count).unwrap_or(0),
            });
            Ok(())
        };

        match window {
            Some(window) => {
                let (lower, upper) = window.webkit_bounds();
                let mut stmt = conn.prepare(VISITS_IN_WINDOW_QUERY)?;
                let mut rows = stmt.query(params![lower, upper])?;
                while let Some(row) = rows.next()? {
                    handle(row)?;
                }
            }
            None => {
                let mut stmt = conn.prepare(VISITS_QUERY)?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    handle(row)?;
                }
            }
        }

        let query_time = start_time.elapsed();
        if rows_seen == 0 {
            warn!(action = "complete", component = "history_query", duration_ms = query_time.as_millis(), "No visit data found");
        } else {
            info!(action = "complete", component = "history_query", row_count = rows_seen, duration_ms = query_time.as_millis(), "History query completed");
        }
        Ok(rows_seen)
    }

    pub fn visits(&self, window: Option<&DateWindow>) -> Result<Vec<VisitRecord>> {
        let mut records = Vec::new();
        self.for_each_visit(window, |record| records.push(record))?;
        Ok(records)
    }

    /// Commit anything pending and close the connection, reporting failures.
    pub fn close(self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        info!(action = "close", component = "history_db", "Closing database connection");
        Ok(())
    }
}

impl Drop for HistoryDb {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                warn!(action = "commit", component = "history_db", error = %e, "Failed to commit pending changes");
            }
        }
        debug!(action = "drop", component = "history_db", "Releasing database connection");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn create_history_schema(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url LONGVARCHAR,
                title LONGVARCHAR,
                visit_count INTEGER DEFAULT 0 NOT NULL,
                typed_count INTEGER DEFAULT 0 NOT NULL,
                last_visit_time INTEGER NOT NULL,
                hidden INTEGER DEFAULT 0 NOT NULL
            );",
        )
        .unwrap();
    }

    pub(crate) fn insert_visit(conn: &Connection, when: &str, url: &str, visit_count: i64) {
        let datetime = NaiveDateTime::parse_from_str(when, TIMESTAMP_FORMAT).unwrap();
        conn.execute(
            "INSERT INTO urls (url, visit_count, last_visit_time) VALUES (?1, ?2, ?3)",
            params![url, visit_count, datetime_to_webkit(datetime)],
        )
        .unwrap();
    }

    fn sample_db() -> HistoryDb {
        let conn = Connection::open_in_memory().unwrap();
        create_history_schema(&conn);
        insert_visit(&conn, "2024-03-07 23:59:59", "https://old.example/", 9);
        insert_visit(&conn, "2024-03-08 00:00:00", "https://example.com/page1", 5);
        insert_visit(&conn, "2024-03-14 23:59:59", "https://test.com/page2", 3);
        insert_visit(&conn, "2024-03-15 00:00:00", "https://future.example/", 2);
        HistoryDb::from_connection(conn)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn webkit_conversion_uses_1601_epoch() {
        let dt = webkit_to_datetime(13_354_884_000_000_000).unwrap();
        assert_eq!(dt.format(TIMESTAMP_FORMAT).to_string(), "2024-03-14 10:00:00");
        assert_eq!(datetime_to_webkit(dt), 13_354_884_000_000_000);
        assert_eq!(format_webkit_timestamp(11_644_473_600_000_000), "1970-01-01 00:00:00");
    }

    #[test]
    fn conversion_truncates_sub_second_precision() {
        assert_eq!(
            format_webkit_timestamp(13_354_884_000_999_999),
            "2024-03-14 10:00:00"
        );
    }

    #[test]
    fn trailing_window_spans_seven_days() {
        let window = DateWindow::trailing_days(date("2024-03-14"), 7);
        assert_eq!(window.from, date("2024-03-07"));
        assert_eq!(window.to, date("2024-03-14"));
    }

    #[test]
    fn window_includes_both_calendar_dates() {
        let db = sample_db();
        let window = DateWindow::new(date("2024-03-08"), date("2024-03-14"));
        let visits = db.visits(Some(&window)).unwrap();

        let urls: Vec<&str> = visits.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/page1", "https://test.com/page2"]);
        assert_eq!(visits[0].timestamp, "2024-03-08 00:00:00");
        assert_eq!(visits[1].timestamp, "2024-03-14 23:59:59");
        assert_eq!(visits[1].visit_count, 3);
    }

    #[test]
    fn no_window_returns_everything() {
        let db = sample_db();
        assert_eq!(db.visits(None).unwrap().len(), 4);
    }

    #[test]
    fn for_each_visit_counts_rows() {
        let db = sample_db();
        let mut total = 0;
        let rows = db.for_each_visit(None, |v| total += v.visit_count).unwrap();
        assert_eq!(rows, 4);
        assert_eq!(total, 19);
        db.close().unwrap();
    }

    #[test]
    fn open_reads_file_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("History");
        {
            let conn = Connection::open(&path).unwrap();
            create_history_schema(&conn);
            insert_visit(&conn, "2024-03-14 12:00:00", "mailto:test@example.com", 1);
        }

        let db = HistoryDb::open(&path).unwrap();
        let visits = db.visits(None).unwrap();
        assert_eq!(
            visits,
            vec![VisitRecord::new("2024-03-14 12:00:00", "mailto:test@example.com", 1)]
        );
    }

    #[test]
    fn drop_commits_pending_transaction() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("History");
        {
            let conn = Connection::open(&path).unwrap();
            create_history_schema(&conn);
        }

        {
            let db = HistoryDb::open(&path).unwrap();
            db.conn.execute_batch("BEGIN").unwrap();
            insert_visit(&db.conn, "2024-03-14 09:00:00", "https://pending.example/", 2);
            assert!(!db.conn.is_autocommit());
        }

        let db = HistoryDb::open(&path).unwrap();
        let visits = db.visits(None).unwrap();
        assert_eq!(
            visits,
            vec![VisitRecord::new("2024-03-14 09:00:00", "https://pending.example/", 2)]
        );
        db.close().unwrap();
    }

    #[test]
    fn query_error_still_releases_connection() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("History");

        {
            let db = HistoryDb::open(&path).unwrap();
            let err = db.for_each_visit(None, |_| {}).unwrap_err();
            assert!(matches!(err, crate::errors::ExtractorError::Database(_)));
        }

        // The file is free again: another connection can write to it.
        let conn = Connection::open(&path).unwrap();
        create_history_schema(&conn);
        insert_visit(&conn, "2024-03-14 12:00:00", "https://after.example/", 1);
        drop(conn);

        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.visits(None).unwrap().len(), 1);
    }
}
