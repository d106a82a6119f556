use std::env;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and pulled into
/// handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and whether Postgres is mandatory.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: pretty logs and an optional database locally, JSON logs and
/// a required database in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Local, in-memory configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `BIND_ADDR`.
    ///
    /// # Errors
    /// `ConfigError::Missing` when `DATABASE_URL` is absent in production, and
    /// `ConfigError::Invalid` when `DB_MAX_CONNECTIONS` is not a positive integer.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        if env == Env::Production && db_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            },
            Err(_) => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            env,
            db_url,
            db_max_connections,
            bind_addr,
        })
    }
}
