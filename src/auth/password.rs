use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};

use crate::config::SecurityConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hash parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Salted argon2id hashing with parameters taken from configuration.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Verified against when an account does not exist, so both login
    /// failures cost the same.
    decoy_hash: String,
}

impl PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = Self::hash_with(&argon2, "decoy-password")?;

        Ok(Self { argon2, decoy_hash })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::new(security.hash_memory_kib, security.hash_iterations)
    }

    fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Self::hash_with(&self.argon2, password)
    }

    /// A malformed stored hash verifies as false.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burns one verification for a login against an unknown account.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy_hash);
        false
    }

    /// `hash` on the blocking thread pool, for use from request handlers.
    pub async fn hash_blocking(self: Arc<Self>, password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || self.hash(&password)).await?
    }

    /// `verify` on the blocking thread pool. With no stored hash the decoy is
    /// verified instead and the result is always false.
    pub async fn verify_blocking(
        self: Arc<Self>,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, PasswordError> {
        let verified = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => self.verify(&password, &hash),
            None => self.verify_decoy(&password),
        })
        .await?;
        Ok(verified)
    }
}
