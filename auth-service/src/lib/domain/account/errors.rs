use thiserror::Error;

/// Input validation failures; safe to show to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Password too short: minimum {min} characters, got {actual}")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors surfaced by the account store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A unique constraint rejected the write.
    #[error("Conflicting record: {0}")]
    Conflict(String),

    #[error("Record not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error for event publishing operations
#[derive(Debug, Clone, Error)]
pub enum EventPublisherError {
    #[error("Failed to serialize event: {0}")]
    SerializationFailed(String),

    #[error("Failed to publish event to broker: {0}")]
    PublishFailed(String),

    #[error("Connection to event broker failed: {0}")]
    ConnectionFailed(String),

    #[error("Event publishing timeout: {0}")]
    Timeout(String),

    #[error("Event publisher is closed")]
    Closed,
}

/// Failures of the hashing and token primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}

/// Category an error falls into at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidArgument,
    AlreadyExists,
    Unauthenticated,
    Internal,
}

/// Top-level error for credential operations.
///
/// `Internal` and `Storage` carry the cause for logging only; the inbound
/// adapters never render it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CredentialError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CredentialError::Validation(_) => ErrorCategory::InvalidArgument,
            CredentialError::EmailExists => ErrorCategory::AlreadyExists,
            CredentialError::InvalidCredentials | CredentialError::InvalidToken => {
                ErrorCategory::Unauthenticated
            }
            CredentialError::Internal(_) | CredentialError::Storage(_) => ErrorCategory::Internal,
        }
    }
}
