//! Configuration module for Agora.

use serde::Deserialize;
use std::path::Path;

use crate::{ForumError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin, without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Key login rate limits on `X-Forwarded-For`. Only enable behind a
    /// reverse proxy that sets the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            trust_forwarded_for: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/agora.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/agora.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// Login attempts allowed per client address per minute.
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_token_expiry() -> u64 {
    86_400 // 1 day
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Forum presentation limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Maximum number of boards returned by the board index.
    #[serde(default = "default_board_index_limit")]
    pub board_index_limit: i64,
    /// Default page size for thread listings.
    #[serde(default = "default_threads_per_page")]
    pub threads_per_page: i64,
}

fn default_board_index_limit() -> i64 {
    20
}

fn default_threads_per_page() -> i64 {
    25
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            board_index_limit: default_board_index_limit(),
            threads_per_page: default_threads_per_page(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Forum limits.
    #[serde(default)]
    pub forum: ForumConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ForumError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ForumError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `AGORA_JWT_SECRET`: Override the token signing secret
    /// - `AGORA_DATABASE_PATH`: Override the database file path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("AGORA_JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(path) = std::env::var("AGORA_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the token secret is unset or limits are not positive.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ForumError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via AGORA_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.login_rate_limit == 0 {
            return Err(ForumError::Config(
                "login_rate_limit must be positive".to_string(),
            ));
        }
        if self.forum.board_index_limit <= 0 || self.forum.threads_per_page <= 0 {
            return Err(ForumError::Config(
                "forum listing limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
