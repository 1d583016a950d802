//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;

use tillpoint_observability::LogFormat;

const DEV_JWT_SECRET: &str = "tillpoint-dev-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: SocketAddr,

    /// HS256 signing secret (`JWT_SECRET`).
    pub jwt_secret: String,

    /// Login token lifetime in seconds (`TOKEN_TTL_SECS`).
    pub token_ttl_secs: i64,

    /// Log output format (`LOG_FORMAT`: `json` or `pretty`).
    pub log_format: LogFormat,

    /// Superuser seeded at startup when both variables are set.
    pub bootstrap_superuser: Option<BootstrapSuperuser>,
}

#[derive(Debug, Clone)]
pub struct BootstrapSuperuser {
    pub email: String,
    pub password: String,
}

impl ApiConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            Some(_) => return Err(ConfigError::InvalidValue("JWT_SECRET".to_string())),
            None => DEV_JWT_SECRET.to_string(),
        };

        let token_ttl_secs: i64 = lookup("TOKEN_TTL_SECS")
            .unwrap_or_else(|| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_SECS".to_string()))?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_SECS".to_string()));
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LOG_FORMAT".to_string()))?,
            None => LogFormat::Json,
        };

        let bootstrap_superuser = match (
            lookup("BOOTSTRAP_SUPERUSER_EMAIL"),
            lookup("BOOTSTRAP_SUPERUSER_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapSuperuser { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired(
                    "BOOTSTRAP_SUPERUSER_PASSWORD".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingRequired(
                    "BOOTSTRAP_SUPERUSER_EMAIL".to_string(),
                ));
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            log_format,
            bootstrap_superuser,
        })
    }
}

impl ApiConfig {
    /// True when `JWT_SECRET` was unset and the built-in dev secret is in use.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
