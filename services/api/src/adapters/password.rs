//! services/api/src/adapters/password.rs
//!
//! Argon2id implementation of the `PasswordHasher` port. Every password is
//! tempered with a server-side pepper before hashing; salts are per hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use taskboard_core::ports::{PasswordHasher, PortError, PortResult};
use tokio::task;

#[derive(Clone)]
pub struct Argon2Hasher {
    pepper: String,
    params: Params,
    placeholder: String,
}

impl Argon2Hasher {
    /// Uses the library's recommended cost parameters.
    pub fn new(pepper: impl Into<String>) -> PortResult<Self> {
        Self::with_params(pepper, Params::default())
    }

    pub fn with_params(pepper: impl Into<String>, params: Params) -> PortResult<Self> {
        let pepper = pepper.into();
        let decoy = SaltString::generate(&mut OsRng);
        let placeholder = hash_tempered(&pepper, &params, decoy.as_str())?;
        Ok(Self {
            pepper,
            params,
            placeholder,
        })
    }
}

fn argon2(params: Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

fn temper(pepper: &str, password: &str) -> String {
    format!("{pepper}$${password}")
}

fn hash_tempered(pepper: &str, params: &Params, plain: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params.clone())
        .hash_password(temper(pepper, plain).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {e}")))
}

fn verify_tempered(pepper: &str, params: &Params, plain: &str, hashed: &str) -> PortResult<bool> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {e}")))?;
    Ok(argon2(params.clone())
        .verify_password(temper(pepper, plain).as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plain: &str) -> PortResult<String> {
        let (pepper, params, plain) = (self.pepper.clone(), self.params.clone(), plain.to_string());
        task::spawn_blocking(move || hash_tempered(&pepper, &params, &plain))
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
    }

    async fn compare(&self, plain: &str, hashed: &str) -> PortResult<bool> {
        let (pepper, params) = (self.pepper.clone(), self.params.clone());
        let (plain, hashed) = (plain.to_string(), hashed.to_string());
        task::spawn_blocking(move || verify_tempered(&pepper, &params, &plain, &hashed))
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
    }

    fn placeholder_hash(&self) -> &str {
        &self.placeholder
    }
}
