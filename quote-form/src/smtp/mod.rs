//! Outgoing mail
//!
//! - [`client`]: the [`Mailer`] seam and its SMTP relay implementation
//! - [`message`]: composed messages handed to a mailer

pub mod client;
pub mod message;

pub use client::{Mailer, SmtpMailer};
pub use message::OutgoingEmail;

#[cfg(test)]
pub use client::MockMailer;
