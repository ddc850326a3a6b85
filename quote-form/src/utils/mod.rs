//! Utility modules
//!
//! - [`email`]: Email address validation (RFC 5321 subset)

pub mod email;

pub use email::validate_email;
