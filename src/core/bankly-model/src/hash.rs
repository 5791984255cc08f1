//! Password hashing seam.
//!
//! The model consumes hashing as an opaque one-way hash/verify capability so
//! tests can substitute a deterministic implementation.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::error::ModelError;

/// One-way credential hashing capability.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password into a storable digest.
    fn hash(&self, plaintext: &str) -> Result<String, ModelError>;

    /// Verifies a plaintext password against a stored digest.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id hasher with fixed default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, ModelError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ModelError::Hash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
