use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Admin session
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub admin_password_hash: Option<String>,
    /// When set, the all-users attendance view and user creation need an admin token
    pub admin_guard: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_api_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

/// Reads `key`, falling back to `default` when unset, and parses it.
fn env_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}"))
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env_or("SERVER_ADDR", "127.0.0.1:8080")?,
            database_url: env_or("DATABASE_URL", "sqlite://attendee.db")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", "5")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", "3600")?, // default 1 hour

            admin_username: env_or("ADMIN_USERNAME", "admin")?,
            admin_password: env_opt("ADMIN_PASSWORD"),
            admin_password_hash: env_opt("ADMIN_PASSWORD_HASH"),
            admin_guard: env_or("ADMIN_GUARD", "false")?,

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", "30")?,
            rate_api_per_min: env_or("RATE_API_PER_MIN", "600")?,

            api_prefix: env_or("API_PREFIX", "/api")?,

            log_dir: env_or("LOG_DIR", "logs")?,
            log_level: env_or("LOG_LEVEL", "info")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_uses_default_when_unset() {
        let port: u32 = env_or("ATTENDEASE_TEST_UNSET_VARIABLE", "42").unwrap();
        assert_eq!(port, 42);
    }

    #[test]
    fn env_or_reports_the_variable_name() {
        let err = env_or::<u32>("ATTENDEASE_TEST_OTHER_UNSET", "not-a-number").unwrap_err();
        assert!(err.to_string().contains("ATTENDEASE_TEST_OTHER_UNSET"));
    }

    #[test]
    fn log_level_parses_from_text() {
        let level: tracing::Level = env_or("ATTENDEASE_TEST_LEVEL_UNSET", "debug").unwrap();
        assert_eq!(level, tracing::Level::DEBUG);
    }
}
