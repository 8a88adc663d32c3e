use serde::Deserialize;
use std::fmt;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Where the records server listens for client connections.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Connection parameters for the PostgreSQL records database.
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Name of the database holding the `empleados` and related tables.
    pub database: String,
    /// Upper bound on concurrently checked-out connections.
    pub max_connections: u32,
    /// How long an operation waits for a free connection before failing.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, e.g. "info" or "personnel=debug,sqlx=warn".
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl ServerSettings {
    /// The `host:port` string to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Keep the password out of logs.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Rejects settings that would only fail later and less clearly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("server.host must not be empty".to_string()));
        }
        if self.database.port == 0 {
            return Err(ConfigError::ValidationError("database.port must not be 0".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.database.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.database must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
