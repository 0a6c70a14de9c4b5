use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an admin session token.
///
/// The token is self-contained: the username plus an absolute expiry is
/// everything needed to decide whether the bearer is still authenticated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Admin identity the token was issued for
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims issued now and expiring after `ttl`.
    ///
    /// # Arguments
    /// * `username` - Admin username
    /// * `ttl` - Lifetime of the token
    pub fn new(username: impl Into<String>, ttl: Duration) -> Self {
        Self::issued_at(username, Utc::now(), ttl)
    }

    /// Create claims for an explicit issuance instant.
    pub fn issued_at(username: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = issued_at + ttl;

        Self {
            username: username.into(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Absolute expiry as a timestamp, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
