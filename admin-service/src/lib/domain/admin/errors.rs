use thiserror::Error;

/// Error for loading the admin identity from its backing record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialStoreError {
    #[error("Credentials record not found: {0}")]
    NotFound(String),

    #[error("Credentials record could not be read: {0}")]
    Unreadable(String),

    #[error("Credentials record is malformed: {0}")]
    Malformed(String),
}

/// Top-level error for admin authentication operations
#[derive(Debug, Clone, Error)]
pub enum AdminError {
    // Request-level errors
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid session")]
    InvalidSession,

    // Infrastructure errors
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),

    #[error("Password error: {0}")]
    Password(String),

    #[error("Token error: {0}")]
    Token(String),
}
