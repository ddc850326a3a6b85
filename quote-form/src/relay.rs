//! Relays a validated quote request as two emails
//!
//! The internal notification goes to the configured recipient first, then
//! the acknowledgment goes back to the submitter. Both sends are always
//! attempted; a failure is logged and reported in the [`RelayOutcome`],
//! never retried.

use std::sync::Arc;
use tracing::{error, info};

use crate::error::Result;
use crate::form::QuoteRequest;
use crate::settings::{Settings, SettingsStore};
use crate::smtp::{Mailer, OutgoingEmail};
use crate::templates::QuoteEmail;

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// What happened to both messages of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub notification: Delivery,
    pub acknowledgment: Delivery,
}

impl RelayOutcome {
    pub fn all_sent(&self) -> bool {
        self.notification.is_sent() && self.acknowledgment.is_sent()
    }
}

pub struct QuoteRelay {
    store: SettingsStore,
    mailer: Arc<dyn Mailer>,
    fallback_recipient: String,
    site_name: String,
}

impl QuoteRelay {
    pub fn new(
        store: SettingsStore,
        mailer: Arc<dyn Mailer>,
        fallback_recipient: String,
        site_name: String,
    ) -> Self {
        Self {
            store,
            mailer,
            fallback_recipient,
            site_name,
        }
    }

    /// Compose and send both messages for `request`.
    ///
    /// Errors only when settings cannot be read or a message cannot be
    /// composed; delivery failures are part of the outcome.
    pub async fn submit(&self, request: &QuoteRequest) -> Result<RelayOutcome> {
        let settings = self
            .store
            .load()
            .await?
            .with_sender_fallback(&self.fallback_recipient);

        let recipient = settings.admin_recipient(&self.fallback_recipient);
        let notification = QuoteEmail::notification(&settings, request, recipient, &self.site_name)?;
        let acknowledgment = QuoteEmail::acknowledgment(&settings, request, &self.site_name);

        let outcome = RelayOutcome {
            notification: self.deliver(&settings, &notification).await,
            acknowledgment: self.deliver(&settings, &acknowledgment).await,
        };

        if outcome.all_sent() {
            info!("Quote request from {} relayed", request.email);
        }

        Ok(outcome)
    }

    async fn deliver(&self, settings: &Settings, email: &OutgoingEmail) -> Delivery {
        match self.mailer.send(settings, email).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                error!("Failed to send email to {}: {}", email.to, e);
                Delivery::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;
    use crate::smtp::MockMailer;
    use mockall::Sequence;
    use tempfile::TempDir;

    fn request() -> QuoteRequest {
        QuoteRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.org".to_string(),
            phone: "+447911123456".to_string(),
            postcode: "SW1A 1AA".to_string(),
        }
    }

    async fn store_with(dir: &TempDir, settings: &Settings) -> SettingsStore {
        let store = SettingsStore::new(dir.path().join("settings.json"));
        store.save(settings).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_sends_notification_then_acknowledgment() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            email_recipient: "sales@example.com".to_string(),
            ..Settings::default()
        };
        let store = store_with(&dir, &settings).await;

        let mut mailer = MockMailer::new();
        let mut seq = Sequence::new();
        mailer
            .expect_send()
            .withf(|_, email| email.to == "sales@example.com" && email.html_body.is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mailer
            .expect_send()
            .withf(|_, email| email.to == "jane@example.org")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let relay = QuoteRelay::new(
            store,
            Arc::new(mailer),
            "admin@example.com".to_string(),
            "Acme".to_string(),
        );
        let outcome = relay.submit(&request()).await.unwrap();

        assert!(outcome.all_sent());
    }

    #[tokio::test]
    async fn test_failed_notification_still_sends_acknowledgment() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|_, email| email.to == "admin@example.com")
            .times(1)
            .returning(|_, _| Err(FormError::Delivery("connection refused".to_string())));
        mailer
            .expect_send()
            .withf(|_, email| email.to == "jane@example.org")
            .times(1)
            .returning(|_, _| Ok(()));

        let relay = QuoteRelay::new(
            store,
            Arc::new(mailer),
            "admin@example.com".to_string(),
            "Acme".to_string(),
        );
        let outcome = relay.submit(&request()).await.unwrap();

        assert!(!outcome.all_sent());
        assert_eq!(
            outcome.notification,
            Delivery::Failed("Delivery failed: connection refused".to_string())
        );
        assert_eq!(outcome.acknowledgment, Delivery::Sent);
    }

    #[tokio::test]
    async fn test_fresh_install_sends_from_admin_email() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|settings, _| settings.sender().1 == "admin@example.com")
            .times(2)
            .returning(|_, _| Ok(()));

        let relay = QuoteRelay::new(
            store,
            Arc::new(mailer),
            "admin@example.com".to_string(),
            "Acme".to_string(),
        );

        assert!(relay.submit(&request()).await.unwrap().all_sent());
    }

    #[tokio::test]
    async fn test_unreadable_settings_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"garbage").unwrap();

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let relay = QuoteRelay::new(
            SettingsStore::new(path),
            Arc::new(mailer),
            "admin@example.com".to_string(),
            "Acme".to_string(),
        );

        assert!(relay.submit(&request()).await.is_err());
    }
}
