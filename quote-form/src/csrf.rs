//! Time-bounded form tokens (nonces)
//!
//! A token is an HMAC-SHA256 over the action name and a time tick. The tick
//! advances every half lifetime, and a token is accepted for the current
//! tick and the previous one, so it stays valid for between half and a full
//! lifetime after it was issued.
//!
//! # Example
//! ```
//! use quote_form::csrf::CsrfGuard;
//! use std::time::Duration;
//!
//! let guard = CsrfGuard::new("secret", Duration::from_secs(86400));
//! let token = guard.issue("quote_form");
//! assert!(guard.verify("quote_form", &token));
//! assert!(!guard.verify("quote_settings", &token));
//! ```

use data_encoding::HEXLOWER;
use ring::hmac;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Action name bound into nonces rendered with the public quote form
pub const QUOTE_FORM_ACTION: &str = "quote_form";

/// Action name bound into nonces rendered with the admin settings form
pub const SETTINGS_ACTION: &str = "quote_settings";

pub struct CsrfGuard {
    key: hmac::Key,
    lifetime: Duration,
}

impl CsrfGuard {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            lifetime,
        }
    }

    /// Issue a token for `action` valid from now
    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, SystemTime::now())
    }

    /// Check a posted token against `action`
    pub fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, SystemTime::now())
    }

    fn issue_at(&self, action: &str, now: SystemTime) -> String {
        let tag = hmac::sign(&self.key, &Self::message(action, self.tick(now)));
        HEXLOWER.encode(tag.as_ref())
    }

    fn verify_at(&self, action: &str, token: &str, now: SystemTime) -> bool {
        let tag = match HEXLOWER.decode(token.trim().as_bytes()) {
            Ok(tag) => tag,
            Err(_) => return false,
        };

        let tick = self.tick(now);
        [tick, tick.saturating_sub(1)]
            .iter()
            .any(|t| hmac::verify(&self.key, &Self::message(action, *t), &tag).is_ok())
    }

    fn tick(&self, now: SystemTime) -> u64 {
        let half = (self.lifetime.as_secs() / 2).max(1);
        let secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        secs.div_ceil(half)
    }

    fn message(action: &str, tick: u64) -> Vec<u8> {
        format!("{}|{}", tick, action).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86400);

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_issue_and_verify() {
        let guard = CsrfGuard::new("test-secret", DAY);
        let token = guard.issue(QUOTE_FORM_ACTION);

        assert_eq!(token.len(), 64);
        assert!(guard.verify(QUOTE_FORM_ACTION, &token));
    }

    #[test]
    fn test_token_bound_to_action_and_secret() {
        let guard = CsrfGuard::new("test-secret", DAY);
        let other = CsrfGuard::new("other-secret", DAY);
        let token = guard.issue(QUOTE_FORM_ACTION);

        assert!(!guard.verify(SETTINGS_ACTION, &token));
        assert!(!other.verify(QUOTE_FORM_ACTION, &token));
    }

    #[test]
    fn test_token_expires_after_two_ticks() {
        let guard = CsrfGuard::new("test-secret", DAY);
        let issued = 1_700_000_000;
        let token = guard.issue_at(QUOTE_FORM_ACTION, at(issued));

        // Still valid half a lifetime later
        assert!(guard.verify_at(QUOTE_FORM_ACTION, &token, at(issued + 43_200)));
        // Never valid a full lifetime later
        assert!(!guard.verify_at(QUOTE_FORM_ACTION, &token, at(issued + 86_400 + 1)));
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        let guard = CsrfGuard::new("test-secret", DAY);
        assert!(!guard.verify(QUOTE_FORM_ACTION, ""));
        assert!(!guard.verify(QUOTE_FORM_ACTION, "not-hex"));
        assert!(!guard.verify(QUOTE_FORM_ACTION, "abcd"));
    }
}
