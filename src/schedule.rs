//! Recurring extraction through the user's crontab.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::errors::{ExtractorError, Result};

/// Every Monday at 15:00.
pub const CRON_SCHEDULE: &str = "0 15 * * 1";

/// Quote `value` for `/bin/sh` unless it is made only of safe characters.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// One crontab line running `executable args...` and sending all output to
/// `log_path`.
pub fn cron_entry(executable: &Path, args: &[String], log_path: &Path) -> String {
    let mut command = shell_quote(&executable.to_string_lossy());
    for arg in args {
        command.push(' ');
        command.push_str(&shell_quote(arg));
    }
    format!(
        "{CRON_SCHEDULE} {command} > {} 2>&1",
        shell_quote(&log_path.to_string_lossy())
    )
}

/// Append `entry` to an existing crontab, unless the exact line is already there.
pub fn append_entry(existing: &str, entry: &str) -> Option<String> {
    if existing.lines().any(|line| line.trim() == entry.trim()) {
        return None;
    }
    let mut table = existing.to_string();
    if !table.is_empty() && !table.ends_with('\n') {
        table.push('\n');
    }
    table.push_str(entry);
    table.push('\n');
    Some(table)
}

/// `~/chrome_history_extractor/history.log`, creating the directory.
pub fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| ExtractorError::Configuration("could not determine home directory".into()))?
        .join("chrome_history_extractor");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("history.log"))
}

fn current_crontab() -> String {
    match Command::new("crontab").arg("-l").stderr(Stdio::null()).output() {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
        Ok(_) => String::new(),
        Err(e) => {
            warn!(action = "read", component = "crontab", error = %e, "Could not read existing crontab");
            String::new()
        }
    }
}

fn write_crontab(table: &str) -> Result<()> {
    let mut child = Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| ExtractorError::Schedule(format!("could not run crontab: {e}")))?;

    {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractorError::Schedule("crontab stdin unavailable".into()))?;
        stdin.write_all(table.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(ExtractorError::Schedule(format!("crontab exited with {status}")));
    }
    Ok(())
}

/// Install `entry` in the user's crontab. Returns false when it was
/// already present.
pub fn install_cron_job(entry: &str) -> Result<bool> {
    let existing = current_crontab();
    match append_entry(&existing, entry) {
        Some(table) => {
            write_crontab(&table)?;
            info!(action = "install", component = "crontab", entry = %entry, "Cron job installed");
            Ok(true)
        }
        None => {
            info!(action = "skip", component = "crontab", entry = %entry, "Cron job already present");
            Ok(false)
        }
    }
}
