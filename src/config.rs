use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "TODO_STORAGE must be `sqlite` or `memory`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageBackend,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let storage = match lookup("TODO_STORAGE") {
            Some(value) => StorageBackend::parse(&value)?,
            None => StorageBackend::Sqlite,
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "DB_MAX_CONNECTIONS must be a positive integer, got `{}`",
                        value
                    ))
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {}", e)))?;

        Ok(Self {
            database_url,
            storage,
            max_connections,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TODO_STORAGE", "Memory"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("BIND_ADDR", "0.0.0.0:3000"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(config_from(&[("TODO_STORAGE", "redis")]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("DB_MAX_CONNECTIONS", "0")]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("BIND_ADDR", "nowhere")]), Err(AppError::Config(_))));
    }
}
