//! Error taxonomy for the extractor.
//!
//! Only three failures are expected in normal operation and each one is
//! recovered close to where it happens:
//!   * `SourceNotFound`: the run stops early and reports "no data".
//!   * `AttachmentMissing`: the attachment is skipped, the email still goes out.
//!   * `EmailDelivery`: reported on stdout, never retried.
//!
//! Everything else propagates to `main`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("history file not found at {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to copy history database to {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("history database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("attachment file '{}' not found", path.display())]
    AttachmentMissing { path: PathBuf },

    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("failed to install cron job: {0}")]
    Schedule(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ExtractorError {
    /// True for the "browser data is simply not here" case.
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, ExtractorError::SourceNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_mentions_path() {
        let err = ExtractorError::SourceNotFound {
            path: PathBuf::from("/nope/History"),
        };
        assert!(err.is_source_not_found());
        assert_eq!(err.to_string(), "history file not found at /nope/History");
    }

    #[test]
    fn io_errors_convert() {
        let err: ExtractorError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(!err.is_source_not_found());
        assert!(err.to_string().contains("boom"));
    }
}
