use crate::error::{FormError, Result};

/// Shortest address accepted, as in `a@b.co`
const MIN_EMAIL_LEN: usize = 6;
const MAX_EMAIL_LEN: usize = 254;

const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Basic email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(FormError::InvalidEmail("Email is empty".to_string()));
    }

    if email.len() < MIN_EMAIL_LEN || email.len() > MAX_EMAIL_LEN {
        return Err(FormError::InvalidEmail("Email length out of range".to_string()));
    }

    if !email.contains('@') {
        return Err(FormError::InvalidEmail(
            "Email must contain @".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(FormError::InvalidEmail("Invalid email format".to_string()));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(FormError::InvalidEmail(
            "Email parts cannot be empty".to_string(),
        ));
    }

    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
    {
        return Err(FormError::InvalidEmail(
            "Local part contains invalid characters".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(FormError::InvalidEmail(
            "Domain must contain a dot".to_string(),
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(FormError::InvalidEmail("Domain has an empty label".to_string()));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(FormError::InvalidEmail(
                "Domain label cannot start or end with a hyphen".to_string(),
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(FormError::InvalidEmail(
                "Domain contains invalid characters".to_string(),
            ));
        }
    }

    Ok(())
}

/// Same check as [`validate_email`], for call sites that only need a yes/no
pub fn is_email(email: &str) -> bool {
    validate_email(email).is_ok()
}
