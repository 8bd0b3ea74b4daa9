use std::env;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::args::SmtpArgs;
use crate::errors::{ExtractorError, Result};

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_path: PathBuf,
    pub copy_path: PathBuf,
}

impl Config {
    /// Explicit paths win; anything missing falls back to the platform default.
    pub fn resolve(history_path: Option<&Path>, copy_path: Option<&Path>) -> Result<Self> {
        let history_path = match history_path {
            Some(path) => path.to_path_buf(),
            None => default_history_path()?,
        };
        let copy_path = match copy_path {
            Some(path) => path.to_path_buf(),
            None => default_copy_path()?,
        };

        info!(action = "resolve", component = "config", history_path = ?history_path, copy_path = ?copy_path, "Resolved history paths");
        Ok(Self {
            history_path,
            copy_path,
        })
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| ExtractorError::Configuration("could not determine home directory".into()))
}

/// Chrome's default profile history database for this OS.
pub fn default_history_path() -> Result<PathBuf> {
    let system = env::consts::OS;
    let path = match system {
        "macos" => home_dir()?.join("Library/Application Support/Google/Chrome/Default/History"),
        "linux" => home_dir()?.join(".config/google-chrome/Default/History"),
        "windows" => dirs::data_local_dir()
            .ok_or_else(|| {
                ExtractorError::Configuration("could not determine local app data directory".into())
            })?
            .join("Google/Chrome/User Data/Default/History"),
        _ => {
            return Err(ExtractorError::Configuration(format!(
                "unsupported operating system '{system}'"
            )))
        }
    };
    Ok(path)
}

pub fn default_copy_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("Documents/History"))
}

/// SMTP settings, only available when every option was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub api_key: String,
    pub sender: String,
    pub recipient: String,
}

impl SmtpSettings {
    pub fn from_args(args: &SmtpArgs) -> Option<Self> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
        }

        Some(Self {
            host: present(&args.smtp_host)?,
            port: args.smtp_port?,
            username: present(&args.username)?,
            api_key: present(&args.api_key)?,
            sender: present(&args.sender_email)?,
            recipient: present(&args.recipient_email)?,
        })
    }
}
