use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::TokenError;

/// Signs and verifies admin session tokens.
///
/// Tokens are HS256 JWTs. Verification is stateless: a token is accepted
/// when its signature matches the server secret and its `exp` claim is not
/// in the past. Rotating the secret invalidates every token issued before.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration at startup, never from request data
    pub fn new(secret: &[u8]) -> Self {
        let algorithm = Algorithm::HS256;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        }
    }

    /// Issue a token for `username` that expires after `ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, username: &str, ttl: Duration) -> Result<String, TokenError> {
        self.encode(&SessionClaims::new(username, ttl))
    }

    /// Encode prepared claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// * `Expired` - `exp` is in the past
    /// * `InvalidSignature` - Token was signed with another secret or tampered with
    /// * `Malformed` - Token structure or claims are invalid
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde::Serialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .issue("admin", Duration::hours(1))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.username, "admin");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1
            .issue("admin", Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(codec2.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_expired_token() {
        let codec = TokenCodec::new(SECRET);

        let issued = Utc::now() - Duration::hours(2);
        let claims = SessionClaims::issued_at("admin", issued, Duration::hours(1));
        let token = codec.encode(&claims).expect("Failed to encode token");

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_garbage() {
        let codec = TokenCodec::new(SECRET);

        let result = codec.verify("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let result = codec.verify("");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_verify_tampered_payload() {
        let codec = TokenCodec::new(SECRET);

        let genuine = codec.issue("admin", Duration::hours(1)).unwrap();
        let forged = codec.issue("intruder", Duration::hours(1)).unwrap();

        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!(
            "{}.{}.{}",
            genuine_parts[0], forged_parts[1], genuine_parts[2]
        );

        assert_eq!(codec.verify(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_requires_expiry() {
        #[derive(Serialize)]
        struct NoExpiry {
            username: String,
            iat: i64,
        }

        let codec = TokenCodec::new(SECRET);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExpiry {
                username: "admin".to_string(),
                iat: Utc::now().timestamp(),
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Malformed(_))));
    }
}
