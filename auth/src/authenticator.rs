use chrono::Duration;

use crate::jwt::SessionClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session tokens.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: TokenCodec,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Signed token to hand to the client
    pub token: String,

    /// Claims embedded in `token`
    pub claims: SessionClaims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `secret` - Secret key for token signing
    pub fn new(secret: &[u8]) -> Self {
        Self::with_hasher(secret, PasswordHasher::new())
    }

    /// Create an authenticator with a custom password hasher.
    pub fn with_hasher(secret: &[u8], password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            codec: TokenCodec::new(secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Compare a password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is not a valid PHC string
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify a password and issue a session token for `username`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `username` - Identity embedded in the token
    /// * `ttl` - Token lifetime
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        username: &str,
        ttl: Duration,
    ) -> Result<SessionToken, AuthenticationError> {
        if !self.verify_password(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_session(username, ttl)?)
    }

    /// Issue a session token without password verification.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_session(&self, username: &str, ttl: Duration) -> Result<SessionToken, TokenError> {
        let claims = SessionClaims::new(username, ttl);
        let token = self.codec.encode(&claims)?;

        Ok(SessionToken { token, claims })
    }

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    /// * `TokenError` - Token is expired, forged or malformed
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.codec.verify(token)
    }
}
