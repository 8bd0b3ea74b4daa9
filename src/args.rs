use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chrome-history-extractor",
    about = "Extract Chrome history and report the most visited domains, mail recipients and pages",
    version,
    long_about = None
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the browser history database
    #[arg(long, env = "CHROME_HISTORY_PATH", global = true)]
    pub history_path: Option<PathBuf>,

    /// Where to copy the history database before reading it
    #[arg(long, env = "CHROME_HISTORY_COPY_PATH", global = true)]
    pub copy_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the last week of history and print it, or email it as CSV
    /// when every SMTP option is given
    ExtractHistory(ExtractArgs),

    /// Add a crontab entry running extract-history every Monday at 15:00
    SetCronJob(SmtpArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub smtp: SmtpArgs,

    /// Directory the CSV reports are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpArgs {
    /// SMTP host
    #[arg(short = 'H', long)]
    pub smtp_host: Option<String>,

    /// SMTP port
    #[arg(short = 'p', long)]
    pub smtp_port: Option<u16>,

    /// SMTP username
    #[arg(short, long)]
    pub username: Option<String>,

    /// SMTP API key or password
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Sender email
    #[arg(short, long)]
    pub sender_email: Option<String>,

    /// Recipient email
    #[arg(short, long)]
    pub recipient_email: Option<String>,
}

impl SmtpArgs {
    /// Re-render the given options as command-line arguments.
    pub fn to_cli_args(&self) -> Vec<String> {
        let port = self.smtp_port.map(|p| p.to_string());
        let pairs = [
            ("-H", self.smtp_host.as_ref()),
            ("-p", port.as_ref()),
            ("-u", self.username.as_ref()),
            ("-k", self.api_key.as_ref()),
            ("-s", self.sender_email.as_ref()),
            ("-r", self.recipient_email.as_ref()),
        ];

        pairs
            .into_iter()
            .filter_map(|(flag, value)| value.map(|v| [flag.to_string(), v.clone()]))
            .flatten()
            .collect()
    }
}
