use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::errors::{ExtractorError, Result};

/// True when `destination` already exists and resolves to the same file as
/// `source`, directly, through `.`/`..` components or through a symlink.
fn is_same_file(source: &Path, destination: &Path) -> io::Result<bool> {
    if !destination.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(source)? == fs::canonicalize(destination)?)
}

/// Copy the live history database to `destination` so queries never touch a
/// file the browser holds locked. An existing destination is overwritten.
pub fn copy_history_database(source: &Path, destination: &Path) -> Result<PathBuf> {
    let start_time = Instant::now();
    info!(action = "start", component = "database_copy", "Copying browser history database");
    info!(action = "copy", component = "database_copy", source = ?source, destination = ?destination, "Database copy paths");

    if !source.is_file() {
        return Err(ExtractorError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }

    let snapshot_err = |e| ExtractorError::Snapshot {
        path: destination.to_path_buf(),
        source: e,
    };

    // Copying a file onto itself truncates it before reading.
    if is_same_file(source, destination).map_err(snapshot_err)? {
        return Err(snapshot_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination is the history database itself",
        )));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(snapshot_err)?;
    }

    let bytes = fs::copy(source, destination).map_err(snapshot_err)?;

    let copy_time = start_time.elapsed();
    info!(action = "complete", component = "database_copy", bytes, duration_ms = copy_time.as_millis(), "Database copy completed");
    Ok(destination.to_path_buf())
}
