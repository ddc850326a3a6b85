//! Settings record: SMTP relay, sender identity, recipient and the three
//! message templates.

pub mod store;
pub mod types;

pub use store::SettingsStore;
pub use types::{Settings, SettingsInput, SmtpEncryption};
