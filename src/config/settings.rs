//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use uuid::Uuid;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_PASSWORD_HASH_STRENGTH, DEFAULT_PROFILE,
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_SEED_EMAIL, DEFAULT_SEED_PASSWORD,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEV_PROFILES,
};
use crate::errors::{AppError, AppResult};

/// Default admin account created on startup in dev/local profiles.
#[derive(Clone)]
pub struct SeedConfig {
    pub enabled: bool,
    pub email: String,
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            email: DEFAULT_SEED_EMAIL.to_string(),
            password: DEFAULT_SEED_PASSWORD.to_string(),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub profile: String,
    pub seed: SeedConfig,
    /// Identity fallback when no principal maps to a local user.
    pub dev_user_id: Option<Uuid>,
    /// Only this client's roles become authorities when set.
    pub oauth2_client_id: Option<String>,
    pub password_hash_strength: u32,
    pub jwt_issuer_uri: Option<String>,
    jwt_secret: Option<String>,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("profile", &self.profile)
            .field("seed_enabled", &self.seed.enabled)
            .field("seed_email", &self.seed.email)
            .field("dev_user_id", &self.dev_user_id)
            .field("oauth2_client_id", &self.oauth2_client_id)
            .field("password_hash_strength", &self.password_hash_strength)
            .field("jwt_issuer_uri", &self.jwt_issuer_uri)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            profile: DEFAULT_PROFILE.to_string(),
            seed: SeedConfig::default(),
            dev_user_id: None,
            oauth2_client_id: None,
            password_hash_strength: DEFAULT_PASSWORD_HASH_STRENGTH,
            jwt_issuer_uri: None,
            jwt_secret: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when no token verification source is configured, or when a
    /// variable holds a value of the wrong shape.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let jwt_issuer_uri = non_empty("JWT_ISSUER_URI");
        let jwt_secret = non_empty("JWT_SECRET");
        if jwt_issuer_uri.is_none() && jwt_secret.is_none() {
            return Err(AppError::internal(
                "either JWT_ISSUER_URI or JWT_SECRET must be set",
            ));
        }

        let dev_user_id = non_empty("APP_DEV_USER_ID")
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| {
                    AppError::internal(format!("APP_DEV_USER_ID is not a UUID: {raw}"))
                })
            })
            .transpose()?;

        Ok(Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            server_host: non_empty("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            profile: non_empty("APP_PROFILE")
                .map(|p| p.to_lowercase())
                .unwrap_or(defaults.profile),
            seed: SeedConfig {
                enabled: parsed("APP_SEED_USER_ENABLED")?.unwrap_or(defaults.seed.enabled),
                email: non_empty("APP_SEED_USER_EMAIL").unwrap_or(defaults.seed.email),
                password: non_empty("APP_SEED_USER_PASSWORD").unwrap_or(defaults.seed.password),
            },
            dev_user_id,
            oauth2_client_id: non_empty("APP_SECURITY_OAUTH2_CLIENT_ID"),
            password_hash_strength: parsed("PASSWORD_HASH_STRENGTH")?
                .unwrap_or(defaults.password_hash_strength),
            jwt_issuer_uri,
            jwt_secret,
            request_timeout: parsed("REQUEST_TIMEOUT_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }

    /// Set the HS256 shared secret.
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Get JWT secret bytes for token verification, if configured.
    pub fn jwt_secret_bytes(&self) -> Option<&[u8]> {
        self.jwt_secret.as_deref().map(str::as_bytes)
    }

    /// Whether the active profile enables development conveniences.
    pub fn is_dev_profile(&self) -> bool {
        DEV_PROFILES.contains(&self.profile.as_str())
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(key: &str) -> AppResult<Option<T>> {
    non_empty(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AppError::internal(format!("{key} has an invalid value: {raw}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.jwt_secret_bytes().is_none());
        assert!(!config.is_dev_profile());
    }

    #[test]
    fn test_dev_profile() {
        let config = Config {
            profile: "local".to_string(),
            ..Config::default()
        };
        assert!(config.is_dev_profile());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::default().with_jwt_secret("super-secret-value");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
