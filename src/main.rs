use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use tracing::info;

use chrome_history_extractor::args::{Args, Command, SmtpArgs};
use chrome_history_extractor::extract::{self, Delivery};
use chrome_history_extractor::{schedule, utils, Config, SmtpSettings};

fn extract_history(config: &Config, smtp: &SmtpArgs, output_dir: &std::path::Path) -> Result<()> {
    let settings = SmtpSettings::from_args(smtp);
    if settings.is_none() && *smtp != SmtpArgs::default() {
        info!(action = "configure", component = "delivery", "Incomplete SMTP options, printing tables instead");
    }
    extract::run(config, Delivery::choose(settings.as_ref(), output_dir))?;
    Ok(())
}

fn set_cron_job(args: &Args, smtp: &SmtpArgs) -> Result<()> {
    let executable = env::current_exe().context("Failed to locate the running executable")?;

    let mut command_args = Vec::new();
    if let Some(path) = &args.history_path {
        command_args.push("--history-path".to_string());
        command_args.push(path.to_string_lossy().into_owned());
    }
    if let Some(path) = &args.copy_path {
        command_args.push("--copy-path".to_string());
        command_args.push(path.to_string_lossy().into_owned());
    }
    command_args.push("extract-history".to_string());
    command_args.extend(smtp.to_cli_args());

    let log_path = schedule::default_log_path()?;
    let entry = schedule::cron_entry(&executable, &command_args, &log_path);
    if schedule::install_cron_job(&entry)? {
        println!("Installed cron job: {}", schedule::CRON_SCHEDULE);
    } else {
        println!("Cron job already installed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    println!();
    println!("{}", utils::yellow("CHROME HISTORY EXTRACTOR"));
    println!();

    match &args.command {
        Command::ExtractHistory(extract_args) => {
            let config = Config::resolve(args.history_path.as_deref(), args.copy_path.as_deref())?;
            extract_history(&config, &extract_args.smtp, &extract_args.output_dir)?;
        }
        Command::SetCronJob(smtp) => set_cron_job(&args, smtp)?,
    }

    println!();
    Ok(())
}
