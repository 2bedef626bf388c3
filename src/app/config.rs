//! Service configuration read from the environment.
//!
//! `bootstrap::init_env` loads a `.env` file first, so every variable below can
//! live there during local development.

use std::{env, net::SocketAddr, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
                var: "HOST",
                message: err.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub page_size: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub stripe: StripeConfig,
    pub catalog: CatalogConfig,
}

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Load configuration from the process environment.
pub fn load() -> Result<AppConfig, ConfigError> {
    from_lookup(|key| env::var(key).ok())
}

/// Build configuration from an arbitrary key lookup.
pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let page_size: i64 = parse_or(&lookup, "CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
    if page_size < 1 {
        return Err(ConfigError::Invalid {
            var: "CATALOG_PAGE_SIZE",
            message: "must be at least 1".into(),
        });
    }

    Ok(AppConfig {
        server: ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
        },
        database: DatabaseConfig {
            url: required(&lookup, "DATABASE_URL")?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        },
        stripe: StripeConfig {
            secret_key: required(&lookup, "STRIPE_SECRET_KEY")?,
            api_base: lookup("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            currency: lookup("PAYMENT_CURRENCY").unwrap_or_else(|| "usd".to_string()),
        },
        catalog: CatalogConfig { page_size },
    })
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            message: err.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bookstore"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.stripe.currency, "usd");
        assert_eq!(config.stripe.api_base, "https://api.stripe.com");
        assert_eq!(config.catalog.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.server.socket_addr().is_ok());
    }

    #[test]
    fn test_missing_database_url() {
        let err = from_lookup(lookup_from(&[("STRIPE_SECRET_KEY", "sk_test_123")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_port() {
        let err = from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bookstore"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bookstore"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
            ("CATALOG_PAGE_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "CATALOG_PAGE_SIZE",
                ..
            }
        ));
    }
}
