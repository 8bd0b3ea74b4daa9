use anstyle::{AnsiColor, Color, Style};
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise `--verbose` selects `info` and the default is `error`.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .try_init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn paint(text: &str, color: AnsiColor) -> String {
    let style = Style::new().fg_color(Some(Color::Ansi(color))).bold();
    format!("{style}{text}{style:#}")
}

pub fn yellow(text: &str) -> String {
    paint(text, AnsiColor::Yellow)
}

pub fn red(text: &str) -> String {
    paint(text, AnsiColor::Red)
}

/// Variables consulted for the login name, in order.
const USER_ENV_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

fn user_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    USER_ENV_VARS
        .iter()
        .find_map(|name| lookup(*name).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Login name used in the email subject. Cron jobs often only set `LOGNAME`.
pub fn current_user() -> String {
    user_from(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    fn env(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn user_lookup_order() {
        assert_eq!(user_from(env(&[("LOGNAME", "cron-user")])), "cron-user");
        assert_eq!(user_from(env(&[("USER", "a"), ("LOGNAME", "b")])), "b");
        assert_eq!(user_from(env(&[("LOGNAME", ""), ("USERNAME", "win")])), "win");
        assert_eq!(user_from(env(&[])), "unknown");
    }

    #[test]
    fn painted_text_is_reset() {
        let s = red("oops");
        assert!(s.contains("oops"));
        assert!(s.ends_with("\u{1b}[0m"));
    }
}
