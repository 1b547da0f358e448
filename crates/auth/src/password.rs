//! Salted, slow one-way password hashing (Argon2id).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use sweetshop_core::DomainError;

/// Argon2 work factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for DomainError {
    fn from(value: PasswordError) -> Self {
        DomainError::internal(value.to_string())
    }
}

/// Argon2id hasher with a fixed work factor.
///
/// CPU-bound; async callers should run it on a blocking thread.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Digest of a throwaway secret under this work factor.
    decoy: String,
}

impl PasswordHasher {
    pub fn new(config: HashConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = hash_with(&argon2, "sweetshop-decoy")?;

        Ok(Self { argon2, decoy })
    }

    /// Hash with a fresh random salt; two calls on the same input differ.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, plaintext)
    }

    /// Check `plaintext` against a stored digest.
    ///
    /// A malformed digest is a mismatch, not an error. Parameters are read
    /// from the digest itself, so hashes made under an older work factor keep
    /// verifying.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against the decoy digest and discard the
    /// result. Callers with no stored digest use this so a miss costs as much
    /// as a wrong password.
    pub fn verify_decoy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.decoy);
    }
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .finish_non_exhaustive()
    }
}
