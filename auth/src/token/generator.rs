use rand::rngs::OsRng;
use rand::RngCore;

/// Default token size in bytes (256 bits of entropy).
const DEFAULT_BYTE_LENGTH: usize = 32;

/// Opaque random token generator.
///
/// Produces hex-encoded tokens drawn from the operating system CSPRNG,
/// used for email verification and password reset links. There is no
/// generator-side uniqueness check: with 256-bit tokens the collision
/// probability is negligible, and callers must not rely on one.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Create a new token generator.
    pub fn new() -> Self {
        Self
    }

    /// Generate a token with the default length (32 bytes, 64 hex chars).
    pub fn generate(&self) -> String {
        self.generate_with_length(DEFAULT_BYTE_LENGTH)
    }

    /// Generate a token from `byte_length` random bytes.
    ///
    /// # Arguments
    /// * `byte_length` - Number of random bytes to draw
    ///
    /// # Returns
    /// Hex-encoded token of `2 * byte_length` characters
    pub fn generate_with_length(&self, byte_length: usize) -> String {
        let mut bytes = vec![0u8; byte_length];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
