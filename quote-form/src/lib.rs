//! quote-form: Quote request form with email relay
//!
//! Serves a five-field quote request form, validates submissions posted to
//! it asynchronously and relays each one as two emails over SMTP: a
//! notification to the site owner and an acknowledgment to the submitter.
//! An admin page edits the SMTP relay and the message templates.
//!
//! # Example
//!
//! ```no_run
//! use quote_form::api::ApiServer;
//! use quote_form::config::Config;
//! use quote_form::smtp::SmtpMailer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let server = ApiServer::new(&config, Arc::new(SmtpMailer));
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`]: HTTP routes, admin pages and rate limiting
//! - [`config`]: Configuration management
//! - [`csrf`]: Time-windowed form nonces
//! - [`error`]: Error types and handling
//! - [`form`]: Sanitizing and validating submissions
//! - [`relay`]: Turning a submission into two deliveries
//! - [`settings`]: The persisted settings record
//! - [`smtp`]: Message composition and SMTP delivery
//! - [`templates`]: Placeholder substitution and the notification layout
//! - [`utils`]: Utility functions (validation, etc.)

pub mod api;
pub mod config;
pub mod csrf;
pub mod error;
pub mod form;
pub mod relay;
pub mod settings;
pub mod smtp;
pub mod templates;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{FormError, Result};
