use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::admin::errors::AdminError;
use crate::admin::errors::CredentialStoreError;

/// The single admin identity allowed to sign in.
///
/// Loaded once at startup and never mutated while the process runs.
#[derive(Clone)]
pub struct AdminIdentity {
    username: String,
    password_hash: String,
}

impl AdminIdentity {
    /// Create a validated admin identity.
    ///
    /// # Arguments
    /// * `username` - Admin username
    /// * `password_hash` - Argon2 hash in PHC string format
    ///
    /// # Errors
    /// * `Malformed` - Username is empty or the hash cannot be parsed
    pub fn new(username: String, password_hash: String) -> Result<Self, CredentialStoreError> {
        if username.is_empty() {
            return Err(CredentialStoreError::Malformed(
                "username must not be empty".to_string(),
            ));
        }

        auth::PasswordHasher::validate_hash(&password_hash)
            .map_err(|e| CredentialStoreError::Malformed(e.to_string()))?;

        Ok(Self {
            username,
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Credentials submitted to the login endpoint.
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl LoginCommand {
    /// Build a login command from raw request fields.
    ///
    /// # Errors
    /// * `MissingCredentials` - Either field is absent or empty
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self, AdminError> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Self { username, password })
            }
            _ => Err(AdminError::MissingCredentials),
        }
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity attached to requests admitted by the session gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub username: String,
}

/// Session issued by a successful login.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Browser retention for the cookie carrying `token`
    pub max_age: Duration,
}

/// Outcome of a non-enforcing session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated(AuthenticatedAdmin),
}
