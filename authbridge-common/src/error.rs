//! Error types for the AuthBridge identity layer

use thiserror::Error;

/// AuthBridge error types
#[derive(Error, Debug)]
pub enum Error {
    // Authentication Errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Signups are currently disabled")]
    SignupDisabled,

    #[error("An account for this identity already exists")]
    DuplicateIdentity,

    #[error("Token missing required claim: {0}")]
    MissingClaim(&'static str),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unauthorized")]
    Unauthorized,

    // General Errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for AuthBridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP status code for each error type
impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::ValidationError(_) => 400,

            // 401 Unauthorized
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::Unauthorized => 401,

            // 403 Forbidden
            Self::SignupDisabled => 403,

            // 404 Not Found
            Self::UserNotFound => 404,

            // 409 Conflict
            Self::DuplicateIdentity => 409,

            // 500 Internal Server Error
            Self::MissingClaim(_)
            | Self::ConfigError(_)
            | Self::StorageError(_)
            | Self::InternalError(_)
            | Self::IoError(_)
            | Self::JsonError(_) => 500,
        }
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound => "user_not_found",
            Self::SignupDisabled => "signup_disabled",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::MissingClaim(_) => "missing_claim",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::Unauthorized => "unauthorized",
            Self::ValidationError(_) => "validation_error",
            Self::ConfigError(_) => "config_error",
            Self::StorageError(_) => "storage_error",
            Self::InternalError(_) => "internal_error",
            Self::IoError(_) => "io_error",
            Self::JsonError(_) => "json_error",
        }
    }
}
