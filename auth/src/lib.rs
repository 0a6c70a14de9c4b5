//! Session authentication primitives for the admin API.
//!
//! Provides:
//! - Password hashing (Argon2id, PHC string format)
//! - Signed, time-limited session tokens (HS256 JWT)
//! - An `Authenticator` tying the two together for the login flow
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.issue("admin", Duration::hours(24)).unwrap();
//! let claims = codec.verify(&token).unwrap();
//! assert_eq!(claims.username, "admin");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::SessionToken;
pub use jwt::SessionClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
