//! Email templates
//!
//! Stored subjects and messages with variable substitution, and the fixed
//! layout of the quote notification.

pub mod quote;
pub mod renderer;

pub use quote::QuoteEmail;
pub use renderer::TemplateRenderer;
