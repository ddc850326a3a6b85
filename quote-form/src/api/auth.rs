//! Admin authentication: Argon2 password check and JWT session cookies

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{FormError, Result};

/// Cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "admin_session";

/// Subject of every admin session token
const ADMIN_SUBJECT: &str = "admin";

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

/// JWT configuration
pub struct JwtConfig {
    /// Secret key for signing tokens
    secret: String,
    /// Token expiration duration
    expiration: Duration,
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration: Duration::from_secs(expiration_hours * 3600),
        }
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Create a new admin session token
    pub fn create_token(&self) -> std::result::Result<String, jsonwebtoken::errors::Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            exp: now + self.expiration.as_secs(),
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// True when the request carries a valid admin session cookie
    pub fn is_admin(&self, headers: &HeaderMap) -> bool {
        session_token(headers)
            .and_then(|token| self.validate_token(&token).ok())
            .map(|claims| claims.sub == ADMIN_SUBJECT)
            .unwrap_or(false)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new("change-me-in-production".to_string(), 12)
    }
}

/// Helper to extract the session token from the cookie header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookies = cookie_header.to_str().ok()?;

    for cookie in cookies.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Hash a password for `admin.password_hash`
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FormError::Config(format!("Failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Check a login attempt against the configured hash.
///
/// An empty hash means admin login is disabled.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool> {
    if stored_hash.is_empty() {
        return Err(FormError::Unauthorized("Admin login is disabled".to_string()));
    }

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| FormError::Config(format!("Invalid admin password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
