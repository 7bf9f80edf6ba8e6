use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for display name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Failure reported by a User Directory implementation
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for all credential operations
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid name: {0}")]
    InvalidName(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already used")]
    EmailAlreadyUsed,

    #[error("Password and confirm password do not match")]
    PasswordMismatch,

    #[error("Invalid account id in token: {0}")]
    InvalidSubject(#[from] AccountIdError),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid or expired refresh token: {0}")]
    InvalidRefreshToken(auth::TokenError),

    #[error("Token has no subject")]
    MissingSubject,

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("Directory error: {0}")]
    DirectoryError(#[from] DirectoryError),
}
