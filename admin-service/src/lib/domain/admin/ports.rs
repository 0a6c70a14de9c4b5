use async_trait::async_trait;

use crate::admin::errors::AdminError;
use crate::admin::errors::CredentialStoreError;
use crate::admin::models::AdminIdentity;
use crate::admin::models::AuthenticatedAdmin;
use crate::admin::models::LoginCommand;
use crate::admin::models::SessionGrant;
use crate::admin::models::SessionStatus;

/// Port for admin session operations.
#[async_trait]
pub trait AdminServicePort: Send + Sync + 'static {
    /// Verify submitted credentials and issue a session.
    ///
    /// # Arguments
    /// * `command` - Non-empty username and password
    ///
    /// # Returns
    /// Session grant carrying the signed token and its cookie lifetime
    ///
    /// # Errors
    /// * `InvalidCredentials` - Username or password does not match
    /// * `Password` - Stored hash could not be used
    /// * `Token` - Token signing failed
    async fn login(&self, command: LoginCommand) -> Result<SessionGrant, AdminError>;

    /// Enforce a valid session token.
    ///
    /// # Arguments
    /// * `token` - Token taken from the session cookie, if any
    ///
    /// # Errors
    /// * `Unauthenticated` - No token was presented
    /// * `InvalidSession` - Token is forged, expired, malformed or for another identity
    fn authenticate_session(&self, token: Option<&str>) -> Result<AuthenticatedAdmin, AdminError>;

    /// Report whether a token is valid without enforcing it.
    fn session_status(&self, token: Option<&str>) -> SessionStatus;
}

/// Read-only source of the admin identity.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Load the admin identity.
    ///
    /// # Errors
    /// * `NotFound` - Backing record is missing
    /// * `Unreadable` - Backing record could not be read
    /// * `Malformed` - Backing record does not describe a valid identity
    async fn load(&self) -> Result<AdminIdentity, CredentialStoreError>;
}
