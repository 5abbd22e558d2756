//! Password hashing and verification (Argon2id).
//!
//! [`PasswordHasher::hash`] draws a fresh salt from the OS RNG for every call,
//! so hashing the same password twice yields two different PHC strings (e.g.
//! `$argon2id$v=19$m=19456,t=2,p=1$...`). [`PasswordHasher::verify`] reads the
//! cost parameters back out of the stored string, so records hashed under an
//! older cost keep verifying after the configured cost changes.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use taskflow_core::{DomainError, DomainResult};

/// Argon2 work factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct HashingCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id hasher with a fixed work factor.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cost: HashingCost) -> DomainResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| DomainError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password. Returns a PHC-format string.
    pub fn hash(&self, plaintext: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check `plaintext` against a stored PHC string.
    ///
    /// A malformed record is a mismatch, not an error.
    pub fn verify(&self, plaintext: &str, record: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(record) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(HashingCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
