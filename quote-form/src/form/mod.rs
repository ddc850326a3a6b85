//! Quote form input handling
//!
//! Raw posted fields are sanitized first, then validated into a
//! [`QuoteRequest`] that the relay can compose messages from.

pub mod sanitize;
pub mod submission;

pub use sanitize::{sanitize_email, sanitize_text_field, sanitize_textarea_field};
pub use submission::{QuoteRequest, QuoteSubmission, FORM_ACTION};
