//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `STOCKROOM_HOST` | `0.0.0.0` |
//! | `STOCKROOM_PORT` | `8080` |
//! | `STOCKROOM_DB_PATH` | platform data dir + `stockroom.db` |
//! | `STOCKROOM_DB_MAX_CONNECTIONS` | `5` |

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use directories::ProjectDirs;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("STOCKROOM_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOCKROOM_HOST".to_string()))?;

        let port = lookup("STOCKROOM_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOCKROOM_PORT".to_string()))?;

        let db_max_connections: u32 = lookup("STOCKROOM_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOCKROOM_DB_MAX_CONNECTIONS".to_string()))?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKROOM_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let database_path = match lookup("STOCKROOM_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        Ok(ServerConfig {
            host,
            port,
            database_path,
            db_max_connections,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Platform data directory for the database file.
///
/// - **macOS**: `~/Library/Application Support/com.stockroom.stockroom/stockroom.db`
/// - **Windows**: `%APPDATA%\stockroom\stockroom\data\stockroom.db`
/// - **Linux**: `~/.local/share/stockroom/stockroom.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "stockroom", "stockroom").ok_or(ConfigError::NoDataDir)?;
    let data_dir = dirs.data_dir();

    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {}", data_dir.display(), e)))?;

    Ok(data_dir.join("stockroom.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set STOCKROOM_DB_PATH")]
    NoDataDir,

    #[error("Could not create data directory {0}")]
    DataDir(String),
}
