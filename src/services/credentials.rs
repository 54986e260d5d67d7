//! Provider passwords
//!
//! Stored only as Argon2id PHC strings in the `password_hash` column. An
//! empty hash means no password has been set and nothing verifies.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use super::errors::{ServiceError, ServiceResult};
use super::{fields, Services};
use crate::store::Record;

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn hash_password(password: &str) -> ServiceResult<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::WeakPassword(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ServiceError::HashingFailed)
}

fn verify_password(password: &str, hash: &[u8]) -> bool {
    let Ok(hash) = std::str::from_utf8(hash) else {
        return false;
    };
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl<'a> Services<'a> {
    /// Sets or replaces a provider's password
    pub fn set_provider_password(&self, provider_id: i64, password: &str) -> ServiceResult<()> {
        let hash = hash_password(password)?;
        let schema = self.registry.providers()?;
        self.store
            .update(
                schema,
                provider_id,
                Record::new().with("password_hash", hash.into_bytes()),
            )
            .map_err(|e| {
                ServiceError::from(e).not_found_as(|| ServiceError::UnknownProvider(provider_id))
            })?;
        Ok(())
    }

    /// Checks a password against the stored hash
    pub fn verify_provider_password(&self, provider_id: i64, password: &str) -> ServiceResult<bool> {
        let record = self.provider_record(provider_id)?;
        let hash = fields::binary(&record, "password_hash")?;
        Ok(!hash.is_empty() && verify_password(password, hash))
    }
}
