use crate::config::Config;
use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

const DEFAULT_ADMIN_PASSWORD: &str = "admin";

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

/// The single admin account, held only as an argon2 hash.
pub struct AdminCredentials {
    pub username: String,
    password_hash: String,
}

impl AdminCredentials {
    /// Prefers `ADMIN_PASSWORD_HASH`; otherwise hashes `ADMIN_PASSWORD` (or the
    /// demo default) once at startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let password_hash = match (&config.admin_password_hash, &config.admin_password) {
            (Some(hash), _) => {
                PasswordHash::new(hash)
                    .map_err(|e| anyhow!("ADMIN_PASSWORD_HASH is not a valid PHC string: {e}"))?;
                hash.clone()
            }
            (None, Some(password)) => hash_password(password)
                .map_err(|e| anyhow!("Failed to hash ADMIN_PASSWORD: {e}"))?,
            (None, None) => {
                warn!(
                    username = %config.admin_username,
                    "No admin password configured, using the demo default"
                );
                hash_password(DEFAULT_ADMIN_PASSWORD)
                    .map_err(|e| anyhow!("Failed to hash default admin password: {e}"))?
            }
        };

        Ok(Self {
            username: config.admin_username.clone(),
            password_hash,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && verify_password(password, &self.password_hash).is_ok()
    }
}
