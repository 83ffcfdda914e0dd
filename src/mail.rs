// src/mail.rs
// Outbound mail. The engine only knows the Mailer trait; the SMTP transport
// lives behind it so a dry run (or a test) can swap in a logger.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::{Error, Result};
use crate::params::{MAIL_SENDER_NAME, SMTP_HOST};

pub trait Mailer {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// STARTTLS submission with authenticated login, one message per send.
pub struct SmtpMailer {
    sender: String,
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(username: &str, password: &str) -> Result<Self> {
        let transport = SmtpTransport::starttls_relay(SMTP_HOST)
            .map_err(|e| Error::Mail {
                recipient: SMTP_HOST.to_string(),
                detail: format!("cannot set up SMTP relay: {e}"),
            })?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { sender: username.to_string(), transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        let mail_err = |detail: String| Error::Mail { recipient: recipient.to_string(), detail };

        let from = format!("{} <{}>", MAIL_SENDER_NAME, self.sender)
            .parse()
            .map_err(|e| mail_err(format!("bad sender address: {e}")))?;
        let to = recipient
            .parse()
            .map_err(|e| mail_err(format!("bad recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| mail_err(format!("cannot build message: {e}")))?;

        self.transport
            .send(&message)
            .map_err(|e| mail_err(e.to_string()))?;
        log::info!("report sent to {recipient}");
        Ok(())
    }
}

/// Dry-run sink: logs what would have been sent.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        log::info!(
            "dry run: would send '{}' ({} bytes) to {}",
            subject,
            html_body.len(),
            recipient
        );
        Ok(())
    }
}
