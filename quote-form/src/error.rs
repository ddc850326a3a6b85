use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Nonce verification failed.")]
    Csrf,

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which submitted field failed and why
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown form action.")]
    UnknownAction,

    #[error("Please enter your name.")]
    MissingName,

    #[error("Name is too long.")]
    NameTooLong,

    #[error("Please enter your email address.")]
    MissingEmail,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Please enter your phone number.")]
    MissingPhone,

    #[error("Please enter a valid UK phone number.")]
    InvalidPhone,

    #[error("Please enter your postal code.")]
    MissingPostcode,

    #[error("Please enter a valid UK postal code.")]
    InvalidPostcode,
}

impl ValidationError {
    /// Wire name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UnknownAction => "action",
            ValidationError::MissingName | ValidationError::NameTooLong => "cfp_name",
            ValidationError::MissingEmail | ValidationError::InvalidEmail => "cfp_email",
            ValidationError::MissingPhone | ValidationError::InvalidPhone => "cfp_phone",
            ValidationError::MissingPostcode | ValidationError::InvalidPostcode => "cfp_postcode",
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
