use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info, warn};

use crate::config::SmtpSettings;
use crate::errors::{ExtractorError, Result};

/// Subject, body and attachments of one report email.
#[derive(Debug, Clone)]
pub struct ReportEmail {
    pub subject: String,
    pub body_text: String,
    pub attachments: Vec<PathBuf>,
}

impl ReportEmail {
    pub fn for_user(user: &str, attachments: Vec<PathBuf>) -> Self {
        Self {
            subject: format!("Chrome History for {user}"),
            body_text: "Chrome History".to_string(),
            attachments,
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| ExtractorError::EmailDelivery(format!("invalid address '{address}': {e}")))
}

fn load_attachment(path: &Path) -> Result<SinglePart> {
    if !path.is_file() {
        return Err(ExtractorError::AttachmentMissing {
            path: path.to_path_buf(),
        });
    }
    let data = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| ExtractorError::EmailDelivery(e.to_string()))?;
    Ok(Attachment::new(filename).body(data, content_type))
}

/// Build the multipart message. Attachments that do not exist are skipped
/// with a warning; their paths are returned alongside the message.
pub fn build_message(
    settings: &SmtpSettings,
    email: &ReportEmail,
) -> Result<(Message, Vec<PathBuf>)> {
    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.body_text.clone()));
    let mut skipped = Vec::new();

    for path in &email.attachments {
        match load_attachment(path) {
            Ok(part) => body = body.singlepart(part),
            Err(ExtractorError::AttachmentMissing { path }) => {
                warn!(action = "attach", component = "email", path = ?path, "Attachment not found, skipping");
                println!(
                    "Warning: Attachment file '{}' not found. Skipping.",
                    path.display()
                );
                skipped.push(path);
            }
            Err(e) => return Err(e),
        }
    }

    let message = Message::builder()
        .from(mailbox(&settings.sender)?)
        .to(mailbox(&settings.recipient)?)
        .subject(email.subject.clone())
        .multipart(body)
        .map_err(|e| ExtractorError::EmailDelivery(e.to_string()))?;

    Ok((message, skipped))
}

fn deliver(settings: &SmtpSettings, email: &ReportEmail) -> Result<()> {
    let (message, _skipped) = build_message(settings, email)?;

    let transport = SmtpTransport::starttls_relay(&settings.host)
        .map_err(|e| ExtractorError::EmailDelivery(e.to_string()))?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.username.clone(),
            settings.api_key.clone(),
        ))
        .build();

    transport
        .send(&message)
        .map_err(|e| ExtractorError::EmailDelivery(e.to_string()))?;
    Ok(())
}

/// Send the report. Failures are printed and logged, never returned, and
/// never retried. Returns whether the email went out.
pub fn send_report(settings: &SmtpSettings, email: &ReportEmail) -> bool {
    let start_time = Instant::now();
    info!(action = "start", component = "email", host = %settings.host, port = settings.port, recipient = %settings.recipient, "Sending report email");

    match deliver(settings, email) {
        Ok(()) => {
            info!(action = "complete", component = "email", duration_ms = start_time.elapsed().as_millis(), "Email sent");
            println!("Email sent successfully!");
            true
        }
        Err(e) => {
            error!(action = "complete", component = "email", error = %e, "Email delivery failed");
            println!("Error sending email: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.invalid".into(),
            port: 587,
            username: "test".into(),
            api_key: "key".into(),
            sender: "sender@test.com".into(),
            recipient: "recipient@test.com".into(),
        }
    }

    #[test]
    fn subject_names_user() {
        let email = ReportEmail::for_user("alice", Vec::new());
        assert_eq!(email.subject, "Chrome History for alice");
        assert_eq!(email.body_text, "Chrome History");
    }

    #[test]
    fn missing_attachments_are_skipped() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("domains.csv");
        fs::write(&present, "URL,Count,Last Visited\n").unwrap();
        let absent = dir.path().join("top_100_urls.csv");

        let email = ReportEmail::for_user("alice", vec![present, absent.clone()]);
        let (message, skipped) = build_message(&settings(), &email).unwrap();
        assert_eq!(skipped, vec![absent]);

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Chrome History for alice"));
        assert!(raw.contains("domains.csv"));
        assert!(!raw.contains("top_100_urls.csv"));
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn bad_address_is_a_delivery_error() {
        let mut bad = settings();
        bad.recipient = "not an address".into();
        let email = ReportEmail::for_user("alice", Vec::new());
        let err = build_message(&bad, &email).unwrap_err();
        assert!(matches!(err, ExtractorError::EmailDelivery(_)));
    }

    #[test]
    fn send_failure_does_not_propagate() {
        let mut bad = settings();
        bad.sender = "broken".into();
        let email = ReportEmail::for_user("alice", Vec::new());
        assert!(!send_report(&bad, &email));
    }
}
