// Server configuration loaded from environment variables
// Decision: Read once in main and pass down; handlers never touch the environment
// Decision: No DATABASE_URL means dev mode (in-memory users, JSON-file sessions)

use std::net::SocketAddr;
use std::path::PathBuf;

use gatehouse_storage::DEFAULT_SESSION_FILE;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API_PORT {0:?}")]
    InvalidPort(String),

    #[error("invalid listen address {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL; `None` selects dev mode
    pub database_url: Option<String>,
    /// JSON file backing `session_db_auth` in dev mode
    pub session_store_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            session_store_path: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// - `API_HOST`: listen host (default `0.0.0.0`)
    /// - `API_PORT`: listen port (default `5000`)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `SESSION_STORE_PATH`: session file for dev mode
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        Ok(Self {
            host: non_empty("API_HOST").unwrap_or(defaults.host),
            port,
            database_url: non_empty("DATABASE_URL"),
            session_store_path: non_empty("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_store_path),
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }
}
