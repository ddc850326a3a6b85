use serde::Serialize;

/// A composed message, ready for a [`Mailer`](crate::smtp::Mailer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    /// Sent as a multipart/alternative HTML part when present
    pub html_body: Option<String>,
    pub text_body: String,
}

impl OutgoingEmail {
    pub fn plain(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            reply_to: None,
            subject: subject.into(),
            html_body: None,
            text_body: body.into(),
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}
