use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::admin::errors::AdminError;
use crate::admin::models::AdminIdentity;
use crate::admin::models::AuthenticatedAdmin;
use crate::admin::models::LoginCommand;
use crate::admin::models::SessionGrant;
use crate::admin::models::SessionStatus;
use crate::admin::ports::AdminServicePort;
use crate::admin::ports::CredentialStore;

/// Domain service for the admin session gate.
///
/// Holds the admin identity and the signing secret, both read-only after
/// construction, so it can be shared across requests without locking.
pub struct AdminService {
    identity: AdminIdentity,
    authenticator: Arc<Authenticator>,
    session_ttl: Duration,
}

impl AdminService {
    /// Create a service around an already loaded identity.
    ///
    /// # Arguments
    /// * `identity` - The admin identity
    /// * `authenticator` - Password verifier and token codec
    /// * `session_ttl` - Lifetime of both the token and its cookie
    pub fn new(identity: AdminIdentity, authenticator: Arc<Authenticator>, session_ttl: Duration) -> Self {
        Self {
            identity,
            authenticator,
            session_ttl,
        }
    }

    /// Load the identity from `store` once and build the service.
    ///
    /// # Errors
    /// * `CredentialStore` - Identity could not be loaded
    pub async fn load<CS: CredentialStore>(
        store: &CS,
        authenticator: Arc<Authenticator>,
        session_ttl: Duration,
    ) -> Result<Self, AdminError> {
        let identity = store.load().await?;

        Ok(Self::new(identity, authenticator, session_ttl))
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

#[async_trait]
impl AdminServicePort for AdminService {
    async fn login(&self, command: LoginCommand) -> Result<SessionGrant, AdminError> {
        if command.username != self.identity.username() {
            // Pay the same hashing cost as a real attempt before rejecting.
            let _ = self
                .authenticator
                .verify_password(&command.password, self.identity.password_hash());

            tracing::warn!(username = %command.username, "Login rejected: unknown username");
            return Err(AdminError::InvalidCredentials);
        }

        let session = self
            .authenticator
            .authenticate(
                &command.password,
                self.identity.password_hash(),
                self.identity.username(),
                self.session_ttl,
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(username = %command.username, "Login rejected: wrong password");
                    AdminError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => AdminError::Password(err.to_string()),
                AuthenticationError::TokenError(err) => AdminError::Token(err.to_string()),
            })?;

        let expires_at = session
            .claims
            .expires_at()
            .unwrap_or_else(|| Utc::now() + self.session_ttl);

        tracing::info!(username = %session.claims.username, %expires_at, "Admin logged in");

        Ok(SessionGrant {
            username: session.claims.username,
            token: session.token,
            expires_at,
            max_age: self.session_ttl,
        })
    }

    fn authenticate_session(&self, token: Option<&str>) -> Result<AuthenticatedAdmin, AdminError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AdminError::Unauthenticated)?;

        let claims = self.authenticator.validate_session(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AdminError::InvalidSession
        })?;

        if claims.username != self.identity.username() {
            tracing::warn!(username = %claims.username, "Session token names an unknown identity");
            return Err(AdminError::InvalidSession);
        }

        Ok(AuthenticatedAdmin {
            username: claims.username,
        })
    }

    fn session_status(&self, token: Option<&str>) -> SessionStatus {
        match self.authenticate_session(token) {
            Ok(admin) => SessionStatus::Authenticated(admin),
            Err(_) => SessionStatus::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::PasswordHasher;
    use auth::SessionClaims;
    use auth::TokenCodec;
    use mockall::mock;

    use super::*;
    use crate::admin::errors::CredentialStoreError;

    const SECRET: &[u8] = b"test-secret-key-for-session-signing!";

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn load(&self) -> Result<AdminIdentity, CredentialStoreError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    fn identity(username: &str, password: &str) -> AdminIdentity {
        let hash = hasher().hash(password).unwrap();
        AdminIdentity::new(username.to_string(), hash).unwrap()
    }

    fn service() -> AdminService {
        AdminService::new(
            identity("admin", "correct-horse"),
            Arc::new(Authenticator::with_hasher(SECRET, hasher())),
            Duration::hours(24),
        )
    }

    fn command(username: &str, password: &str) -> LoginCommand {
        LoginCommand::new(Some(username.to_string()), Some(password.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_load_reads_store_once() {
        let mut store = MockTestCredentialStore::new();
        let loaded = identity("admin", "correct-horse");

        store
            .expect_load()
            .times(1)
            .returning(move || Ok(loaded.clone()));

        let service = AdminService::load(
            &store,
            Arc::new(Authenticator::new(SECRET)),
            Duration::hours(1),
        )
        .await
        .expect("Failed to load service");

        assert_eq!(service.username(), "admin");
        assert_eq!(service.session_ttl(), Duration::hours(1));
    }

    #[tokio::test]
    async fn test_load_propagates_store_failure() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_load()
            .times(1)
            .returning(|| Err(CredentialStoreError::NotFound("user.json".to_string())));

        let result = AdminService::load(
            &store,
            Arc::new(Authenticator::new(SECRET)),
            Duration::hours(1),
        )
        .await;

        assert!(matches!(
            result,
            Err(AdminError::CredentialStore(CredentialStoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = service();

        let grant = service
            .login(command("admin", "correct-horse"))
            .await
            .expect("Login failed");

        assert_eq!(grant.username, "admin");
        assert_eq!(grant.max_age, Duration::hours(24));
        assert!(grant.expires_at > Utc::now() + Duration::hours(23));

        let admin = service
            .authenticate_session(Some(&grant.token))
            .expect("Issued token rejected");
        assert_eq!(admin.username, "admin");
    }

    #[tokio::test]
    async fn test_login_wrong_username_and_password_look_the_same() {
        let service = service();

        let wrong_user = service
            .login(command("admin William", "correct-horse"))
            .await
            .unwrap_err();
        let wrong_password = service
            .login(command("admin", "wrongpass"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_user, AdminError::InvalidCredentials));
        assert!(matches!(wrong_password, AdminError::InvalidCredentials));
        assert_eq!(wrong_user.to_string(), wrong_password.to_string());
    }

    #[test]
    fn test_authenticate_session_without_token() {
        let service = service();

        assert!(matches!(
            service.authenticate_session(None),
            Err(AdminError::Unauthenticated)
        ));
        assert!(matches!(
            service.authenticate_session(Some("")),
            Err(AdminError::Unauthenticated)
        ));
    }

    #[test]
    fn test_authenticate_session_with_bad_tokens() {
        let service = service();

        assert!(matches!(
            service.authenticate_session(Some("not-a-token")),
            Err(AdminError::InvalidSession)
        ));

        let foreign = TokenCodec::new(b"some-other-secret-of-enough-length!")
            .issue("admin", Duration::hours(1))
            .unwrap();
        assert!(matches!(
            service.authenticate_session(Some(&foreign)),
            Err(AdminError::InvalidSession)
        ));

        let codec = TokenCodec::new(SECRET);
        let expired = codec
            .encode(&SessionClaims::issued_at(
                "admin",
                Utc::now() - Duration::days(8),
                Duration::days(7),
            ))
            .unwrap();
        assert!(matches!(
            service.authenticate_session(Some(&expired)),
            Err(AdminError::InvalidSession)
        ));

        let other_identity = codec.issue("someone-else", Duration::hours(1)).unwrap();
        assert!(matches!(
            service.authenticate_session(Some(&other_identity)),
            Err(AdminError::InvalidSession)
        ));
    }

    #[test]
    fn test_session_status() {
        let service = service();
        let token = TokenCodec::new(SECRET)
            .issue("admin", Duration::hours(1))
            .unwrap();

        assert_eq!(service.session_status(None), SessionStatus::Anonymous);
        assert_eq!(service.session_status(Some("garbage")), SessionStatus::Anonymous);
        assert_eq!(
            service.session_status(Some(&token)),
            SessionStatus::Authenticated(AuthenticatedAdmin {
                username: "admin".to_string()
            })
        );
    }
}
