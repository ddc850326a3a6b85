//! HTTP surface of quote-form
//!
//! Serves the form, accepts submissions and hosts the admin settings pages

pub mod auth;
pub mod handlers;
pub mod server;
pub mod web;

pub use server::ApiServer;
