//! Settings record and the admin form it is edited through

use serde::{Deserialize, Serialize};

use crate::form::sanitize::{sanitize_email, sanitize_text_field, sanitize_textarea_field};

pub const DEFAULT_NEW_QUOTE_SUBJECT: &str = "New Quote Request from %s";
pub const DEFAULT_THANK_YOU_SUBJECT: &str = "Thank You for Your Quote Request";
pub const DEFAULT_THANK_YOU_MESSAGE: &str =
    "We appreciate your request. We will get back to you shortly.";

/// Transport security for the SMTP relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpEncryption {
    /// Plain connection
    #[default]
    #[serde(alias = "")]
    None,
    /// STARTTLS upgrade
    Tls,
    /// Implicit TLS from the first byte
    Ssl,
}

impl SmtpEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpEncryption::None => "none",
            SmtpEncryption::Tls => "tls",
            SmtpEncryption::Ssl => "ssl",
        }
    }

    /// Parse the admin form value; anything unrecognised means no encryption
    pub fn from_form(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tls" | "starttls" => SmtpEncryption::Tls,
            "ssl" => SmtpEncryption::Ssl,
            _ => SmtpEncryption::None,
        }
    }

    /// Port used when the record stores none
    pub fn default_port(&self) -> u16 {
        match self {
            SmtpEncryption::None => 25,
            SmtpEncryption::Tls => 587,
            SmtpEncryption::Ssl => 465,
        }
    }
}

/// The persisted key-value settings record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub smtp_host: String,
    /// 0 means the default port for the chosen encryption
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_encryption: SmtpEncryption,
    pub email_from_name: String,
    pub email_from_address: String,
    pub email_recipient: String,
    pub new_quote_subject: String,
    pub thank_you_subject: String,
    pub thank_you_message: String,
}

/// Fields posted by the admin settings page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsInput {
    pub smtp_host: String,
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_encryption: String,
    pub email_from_name: String,
    pub email_from_address: String,
    pub email_recipient: String,
    pub new_quote_subject: String,
    pub thank_you_subject: String,
    pub thank_you_message: String,
    pub settings_nonce: String,
}

impl Settings {
    /// Build a record from posted fields.
    ///
    /// A blank password keeps the one in `current`, since the page never
    /// echoes it back.
    pub fn sanitized(input: &SettingsInput, current: &Settings) -> Self {
        let smtp_pass = if input.smtp_pass.is_empty() {
            current.smtp_pass.clone()
        } else {
            sanitize_text_field(&input.smtp_pass)
        };

        Self {
            smtp_host: sanitize_text_field(&input.smtp_host),
            smtp_port: absint_port(&input.smtp_port),
            smtp_user: sanitize_text_field(&input.smtp_user),
            smtp_pass,
            smtp_encryption: SmtpEncryption::from_form(&input.smtp_encryption),
            email_from_name: sanitize_text_field(&input.email_from_name),
            email_from_address: sanitize_email(&input.email_from_address),
            email_recipient: sanitize_email(&input.email_recipient),
            new_quote_subject: sanitize_text_field(&input.new_quote_subject),
            thank_you_subject: sanitize_text_field(&input.thank_you_subject),
            thank_you_message: sanitize_textarea_field(&input.thank_you_message),
        }
    }

    pub fn effective_port(&self) -> u16 {
        if self.smtp_port == 0 {
            self.smtp_encryption.default_port()
        } else {
            self.smtp_port
        }
    }

    pub fn new_quote_subject(&self) -> &str {
        non_blank(&self.new_quote_subject).unwrap_or(DEFAULT_NEW_QUOTE_SUBJECT)
    }

    pub fn thank_you_subject(&self) -> &str {
        non_blank(&self.thank_you_subject).unwrap_or(DEFAULT_THANK_YOU_SUBJECT)
    }

    pub fn thank_you_message(&self) -> &str {
        non_blank(&self.thank_you_message).unwrap_or(DEFAULT_THANK_YOU_MESSAGE)
    }

    /// Where quote notifications go: the stored recipient, else `fallback`
    pub fn admin_recipient<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(&self.email_recipient).unwrap_or(fallback)
    }

    /// Sender address and optional display name for outgoing mail
    pub fn sender(&self) -> (Option<&str>, &str) {
        let address = non_blank(&self.email_from_address)
            .unwrap_or(self.email_recipient.as_str());
        (non_blank(&self.email_from_name), address)
    }

    /// Fill a blank sender address with `fallback`
    pub fn with_sender_fallback(mut self, fallback: &str) -> Self {
        if self.sender().1.is_empty() {
            self.email_from_address = fallback.trim().to_string();
        }
        self
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Non-negative integer coercion; junk and out-of-range values become 0
fn absint_port(value: &str) -> u16 {
    value
        .trim()
        .parse::<i64>()
        .map(|n| n.unsigned_abs())
        .ok()
        .and_then(|n| u16::try_from(n).ok())
        .unwrap_or(0)
}
