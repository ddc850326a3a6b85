//! SMTP client for relaying outgoing emails
//!
//! Each send builds a fresh transport from the settings record, so changes
//! made on the admin page apply to the next message without a restart.
//!
//! # Encryption
//! - `none`: plain SMTP on the configured port (default 25)
//! - `tls`: STARTTLS upgrade (default port 587)
//! - `ssl`: implicit TLS (default port 465)

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{FormError, Result};
use crate::settings::{Settings, SmtpEncryption};
use crate::smtp::OutgoingEmail;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery seam between the relay and the network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message using the relay described by `settings`
    async fn send(&self, settings: &Settings, email: &OutgoingEmail) -> Result<()>;
}

/// [`Mailer`] backed by a lettre SMTP transport
///
/// # Examples
/// ```no_run
/// use quote_form::settings::Settings;
/// use quote_form::smtp::{Mailer, OutgoingEmail, SmtpMailer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings {
///     smtp_host: "smtp.example.com".to_string(),
///     email_from_address: "quotes@example.com".to_string(),
///     ..Settings::default()
/// };
/// let email = OutgoingEmail::plain("customer@example.org", "Hello", "Thanks!");
/// SmtpMailer.send(&settings, &email).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, settings: &Settings, email: &OutgoingEmail) -> Result<()> {
        let message = build_message(settings, email)?;
        let transport = build_transport(settings)?;

        debug!(
            "Relaying to {} via {}:{}",
            email.to,
            settings.smtp_host,
            settings.effective_port()
        );

        let response = transport
            .send(message)
            .await
            .map_err(|e| FormError::Delivery(e.to_string()))?;

        info!("Mail sent successfully to {} ({})", email.to, response.code());
        Ok(())
    }
}

/// Build the lettre transport for the configured relay
pub fn build_transport(settings: &Settings) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let host = settings.smtp_host.trim();
    if host.is_empty() {
        return Err(FormError::Delivery("SMTP host is not configured".to_string()));
    }

    let builder = match settings.smtp_encryption {
        SmtpEncryption::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        SmtpEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| FormError::Delivery(format!("STARTTLS setup failed: {}", e)))?,
        SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| FormError::Delivery(format!("TLS setup failed: {}", e)))?,
    };

    let mut builder = builder
        .port(settings.effective_port())
        .timeout(Some(SEND_TIMEOUT));

    if !settings.smtp_user.is_empty() {
        builder = builder.credentials(Credentials::new(
            settings.smtp_user.clone(),
            settings.smtp_pass.clone(),
        ));
    }

    Ok(builder.build())
}

/// Turn an [`OutgoingEmail`] into a MIME message with the configured sender
pub fn build_message(settings: &Settings, email: &OutgoingEmail) -> Result<Message> {
    let (from_name, from_address) = settings.sender();
    let from_address: Address = from_address
        .parse()
        .map_err(|e| FormError::InvalidEmail(format!("sender {:?}: {}", from_address, e)))?;
    let from = Mailbox::new(from_name.map(str::to_string), from_address);

    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| FormError::InvalidEmail(format!("recipient {:?}: {}", email.to, e)))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone());

    if let Some(reply_to) = &email.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .map_err(|e| FormError::InvalidEmail(format!("reply-to {:?}: {}", reply_to, e)))?;
        builder = builder.reply_to(reply_to);
    }

    let message = match &email.html_body {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            html.clone(),
        )),
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone()),
    };

    message.map_err(|e| FormError::Delivery(format!("Failed to build message: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            smtp_host: "smtp.example.com".to_string(),
            email_from_name: "Acme Quotes".to_string(),
            email_from_address: "quotes@example.com".to_string(),
            email_recipient: "sales@example.com".to_string(),
            ..Settings::default()
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).to_string()
    }

    #[test]
    fn test_plain_message_headers() {
        let email = OutgoingEmail::plain("jane@example.org", "Thank You", "We got it.");
        let message = build_message(&settings(), &email).unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Acme Quotes"));
        assert!(raw.contains("<quotes@example.com>"));
        assert!(raw.contains("To: jane@example.org"));
        assert!(raw.contains("Subject: Thank You"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn test_html_message_is_multipart() {
        let email = OutgoingEmail::plain("sales@example.com", "New quote", "Full Name: Jane")
            .with_html("<table><tr><td>Jane</td></tr></table>")
            .with_reply_to("jane@example.org");
        let raw = formatted(&build_message(&settings(), &email).unwrap());

        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Reply-To: jane@example.org"));
    }

    #[test]
    fn test_missing_sender_is_rejected() {
        let settings = Settings {
            smtp_host: "smtp.example.com".to_string(),
            ..Settings::default()
        };
        let email = OutgoingEmail::plain("jane@example.org", "Hi", "Body");

        assert!(matches!(
            build_message(&settings, &email),
            Err(FormError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_transport_requires_host() {
        let settings = Settings::default();
        assert!(matches!(
            build_transport(&settings),
            Err(FormError::Delivery(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_for_each_encryption() {
        for encryption in [SmtpEncryption::None, SmtpEncryption::Tls, SmtpEncryption::Ssl] {
            let settings = Settings {
                smtp_encryption: encryption,
                smtp_user: "relay".to_string(),
                smtp_pass: "secret".to_string(),
                ..settings()
            };
            assert!(build_transport(&settings).is_ok());
        }
    }
}
