//! Posted quote form and its validated counterpart

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::form::sanitize::{sanitize_email, sanitize_text_field};
use crate::utils::email::is_email;

/// Value of the `action` field sent by the form script
pub const FORM_ACTION: &str = "submit_quote_form";

const MAX_NAME_CHARS: usize = 100;

// ASCII digits only: `\d` in regex matches any Unicode digit
const UK_PHONE_PATTERN: &str = r"^\+44[1-9][0-9]{9}$";
const UK_POSTCODE_PATTERN: &str = r"^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$";

/// Raw form post, exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSubmission {
    pub action: Option<String>,
    pub cfp_name: Option<String>,
    pub cfp_email: Option<String>,
    pub cfp_phone: Option<String>,
    pub cfp_postcode: Option<String>,
    pub cfp_nonce: Option<String>,
}

/// A sanitized, validated quote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub postcode: String,
}

impl QuoteSubmission {
    /// CSRF token, if one was posted
    pub fn nonce(&self) -> Option<&str> {
        self.cfp_nonce.as_deref().filter(|n| !n.is_empty())
    }

    /// Sanitize every field and check it, reporting the first failure
    pub fn validate(&self) -> Result<QuoteRequest, ValidationError> {
        if let Some(action) = self.action.as_deref() {
            if action != FORM_ACTION {
                return Err(ValidationError::UnknownAction);
            }
        }

        let full_name = sanitize_text_field(self.cfp_name.as_deref().unwrap_or_default());
        if full_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if full_name.chars().count() > MAX_NAME_CHARS {
            return Err(ValidationError::NameTooLong);
        }

        let raw_email = self.cfp_email.as_deref().unwrap_or_default().trim();
        if raw_email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        let email = sanitize_email(raw_email);
        if !is_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        let raw_phone = sanitize_text_field(self.cfp_phone.as_deref().unwrap_or_default());
        if raw_phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        let phone = normalize_phone(&raw_phone);
        if !matches_pattern(UK_PHONE_PATTERN, &phone) {
            return Err(ValidationError::InvalidPhone);
        }

        let raw_postcode = sanitize_text_field(self.cfp_postcode.as_deref().unwrap_or_default());
        if raw_postcode.is_empty() {
            return Err(ValidationError::MissingPostcode);
        }
        let postcode = raw_postcode.to_uppercase();
        if !matches_pattern(UK_POSTCODE_PATTERN, &postcode) {
            return Err(ValidationError::InvalidPostcode);
        }

        Ok(QuoteRequest {
            full_name,
            email,
            phone,
            postcode: canonical_postcode(&postcode),
        })
    }
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Strip separators and rewrite national/international prefixes to `+44`
fn normalize_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(*c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if let Some(rest) = digits.strip_prefix("0044") {
        format!("+44{}", rest)
    } else if let Some(rest) = digits.strip_prefix("44") {
        format!("+44{}", rest)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+44{}", rest)
    } else {
        digits
    }
}

/// `SW1A1AA` becomes `SW1A 1AA`; the inward code is always the last three characters
fn canonical_postcode(postcode: &str) -> String {
    let compact: String = postcode.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.char_indices().rev().nth(2) {
        Some((split, _)) if split > 0 => {
            format!("{} {}", &compact[..split], &compact[split..])
        }
        _ => compact,
    }
}
