//! Authentication utilities library
//!
//! Provides the credential primitives consumed by the account service:
//! - Password hashing (Argon2id)
//! - Opaque random token generation (verification / reset tokens)
//! - Signed session token issuance and verification (JWT, HS256)
//!
//! The service defines its own domain traits and composes these
//! implementations; nothing in this crate touches storage or I/O.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth::TokenGenerator;
//!
//! let generator = TokenGenerator::new();
//! let token = generator.generate();
//! assert_eq!(token.len(), 64); // 32 random bytes, hex-encoded
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::SessionTokenIssuer;
//!
//! let issuer = SessionTokenIssuer::new(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.issue("user123").unwrap();
//! let claims = issuer.verify(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```

pub mod password;
pub mod session;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use session::SessionClaims;
pub use session::SessionTokenError;
pub use session::SessionTokenIssuer;
pub use token::TokenGenerator;
