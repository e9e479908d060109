use serde::Deserialize;
use std::{env, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub port: u16,
    pub host: String,
    pub allowed_origins: Vec<String>,
    pub frontend_url: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_hours: parse_or(
                "JWT_EXPIRY_HOURS",
                env::var("JWT_EXPIRY_HOURS").ok(),
                24,
            )?,
            port: parse_or("PORT", env::var("PORT").ok(), 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Parses `raw` when set, falling back to `default` only when unset.
fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_number_uses_default() {
        assert_eq!(parse_or::<u16>("PORT", None, 3000).unwrap(), 3000);
    }

    #[test]
    fn set_number_is_parsed() {
        let hours = parse_or::<i64>("JWT_EXPIRY_HOURS", Some(" 48 ".to_string()), 24).unwrap();
        assert_eq!(hours, 48);
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = parse_or::<u16>("PORT", Some("80a".to_string()), 3000).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", ref value } if value == "80a"));
        assert_eq!(err.to_string(), "invalid value \"80a\" for PORT");
    }
}
