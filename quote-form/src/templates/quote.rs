//! The two messages sent for every quote request

use askama::Template;
use std::collections::HashMap;

use crate::error::Result;
use crate::form::QuoteRequest;
use crate::settings::Settings;
use crate::smtp::OutgoingEmail;
use crate::templates::TemplateRenderer;

#[derive(Template)]
#[template(path = "emails/quote_notification.html")]
struct QuoteNotificationHtml<'a> {
    heading: &'a str,
    request: &'a QuoteRequest,
}

/// Message composition for a validated quote request
pub struct QuoteEmail;

impl QuoteEmail {
    /// Variables available to stored subjects and the thank-you message
    pub fn variables(request: &QuoteRequest, site_name: &str) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), request.full_name.clone()),
            ("email".to_string(), request.email.clone()),
            ("phone".to_string(), request.phone.clone()),
            ("postcode".to_string(), request.postcode.clone()),
            ("site_name".to_string(), site_name.to_string()),
        ])
    }

    /// Internal notification with the submitted details, addressed to `recipient`
    pub fn notification(
        settings: &Settings,
        request: &QuoteRequest,
        recipient: &str,
        site_name: &str,
    ) -> Result<OutgoingEmail> {
        let vars = Self::variables(request, site_name);
        let subject =
            TemplateRenderer::render_subject(settings.new_quote_subject(), &request.postcode, &vars);

        let heading = format!("{} Quote Request", site_name);
        let html = QuoteNotificationHtml {
            heading: &heading,
            request,
        }
        .render()?;

        let text = format!(
            "{}\n\nFull Name: {}\nEmail Address: {}\nMobile Number: {}\nPostal Code: {}\n",
            heading, request.full_name, request.email, request.phone, request.postcode
        );

        Ok(OutgoingEmail::plain(recipient, subject, text)
            .with_html(html)
            .with_reply_to(request.email.clone()))
    }

    /// Acknowledgment sent back to the person who asked for the quote
    pub fn acknowledgment(settings: &Settings, request: &QuoteRequest, site_name: &str) -> OutgoingEmail {
        let vars = Self::variables(request, site_name);
        let subject = TemplateRenderer::render_string(settings.thank_you_subject(), &vars);
        let body = TemplateRenderer::render_string(settings.thank_you_message(), &vars);

        OutgoingEmail::plain(request.email.clone(), subject, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QuoteRequest {
        QuoteRequest {
            full_name: "Jane <O'Hara>".to_string(),
            email: "jane@example.org".to_string(),
            phone: "+447911123456".to_string(),
            postcode: "SW1A 1AA".to_string(),
        }
    }

    #[test]
    fn test_notification_uses_stored_subject() {
        let settings = Settings {
            new_quote_subject: "Quote wanted in %s".to_string(),
            ..Settings::default()
        };
        let email =
            QuoteEmail::notification(&settings, &request(), "sales@example.com", "Acme").unwrap();

        assert_eq!(email.to, "sales@example.com");
        assert_eq!(email.subject, "Quote wanted in SW1A 1AA");
        assert_eq!(email.reply_to.as_deref(), Some("jane@example.org"));
        assert!(email.text_body.contains("Mobile Number: +447911123456"));
    }

    #[test]
    fn test_notification_default_subject_and_escaped_html() {
        let email = QuoteEmail::notification(
            &Settings::default(),
            &request(),
            "sales@example.com",
            "Acme",
        )
        .unwrap();

        assert_eq!(email.subject, "New Quote Request from SW1A 1AA");
        let html = email.html_body.unwrap();
        assert!(html.contains("Acme Quote Request"));
        assert!(html.contains("Jane &lt;O"));
        assert!(!html.contains("<O'Hara>"));
        assert!(html.contains("Postal Code"));
    }

    #[test]
    fn test_acknowledgment() {
        let settings = Settings {
            thank_you_subject: "Thanks from {{site_name}}".to_string(),
            thank_you_message: "Hi {{name}},\nwe will call {{phone}}.".to_string(),
            ..Settings::default()
        };
        let email = QuoteEmail::acknowledgment(&settings, &request(), "Acme");

        assert_eq!(email.to, "jane@example.org");
        assert_eq!(email.subject, "Thanks from Acme");
        assert_eq!(email.text_body, "Hi Jane <O'Hara>,\nwe will call +447911123456.");
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_acknowledgment_defaults() {
        let email = QuoteEmail::acknowledgment(&Settings::default(), &request(), "Acme");

        assert_eq!(email.subject, "Thank You for Your Quote Request");
        assert_eq!(
            email.text_body,
            "We appreciate your request. We will get back to you shortly."
        );
    }
}
