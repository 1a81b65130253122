use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::SessionTokenError;

/// Session lifetime: 24 hours from issuance.
const SESSION_TTL_HOURS: i64 = 24;

/// Issues and verifies signed, time-bound session tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a symmetric secret held in
/// process configuration. Verification fails closed: a signature
/// mismatch, malformed token, or expired token all come back as
/// [`SessionTokenError::Invalid`].
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl SessionTokenIssuer {
    /// Create a new issuer with a signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a session token for a user, expiring 24 hours from now.
    ///
    /// # Arguments
    /// * `user_id` - User identifier to encode as the subject claim
    ///
    /// # Returns
    /// Signed JWT string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, user_id: impl ToString) -> Result<String, SessionTokenError> {
        let claims = SessionClaims::for_user(user_id, SESSION_TTL_HOURS);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a session token and return its claims.
    ///
    /// # Arguments
    /// * `token` - JWT string to verify
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Invalid` - Signature mismatch, malformed token, or expired token
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let validation = Validation::new(self.algorithm);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| SessionTokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono::Utc;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_issue_and_verify() {
        let issuer = SessionTokenIssuer::new(SECRET);

        let token = issuer.issue("user123").expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = issuer.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_HOURS * 60 * 60);
    }

    #[test]
    fn test_verify_malformed_token() {
        let issuer = SessionTokenIssuer::new(SECRET);

        let result = issuer.verify("invalid.token.here");
        assert!(matches!(result, Err(SessionTokenError::Invalid)));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let issuer = SessionTokenIssuer::new(SECRET);
        let other = SessionTokenIssuer::new(b"another_secret_at_least_32_bytes!!!");

        let token = issuer.issue("user123").expect("Failed to issue token");

        let result = other.verify(&token);
        assert!(matches!(result, Err(SessionTokenError::Invalid)));
    }

    #[test]
    fn test_verify_expired_token() {
        let issuer = SessionTokenIssuer::new(SECRET);

        // Encode claims that expired two hours ago, past validation leeway
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "user123".to_string(),
            iat: (now - Duration::hours(26)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        let result = issuer.verify(&token);
        assert!(matches!(result, Err(SessionTokenError::Invalid)));
    }
}
