use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a session token.
///
/// Fixed shape: subject (user id), issued-at, and expiration. Session
/// tokens are stateless; nothing beyond the user identity is encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for a user, expiring `ttl_hours` from now.
    pub fn for_user(user_id: impl ToString, ttl_hours: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(ttl_hours);

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}
