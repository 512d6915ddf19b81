//! Configuration management

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub accounts: AccountConfig,
}

/// HTTP and database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// sqlx connection string
    pub database_url: String,
    pub max_connections: u32,
}

/// Account service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// HS256 signing secret, at least 32 bytes
    pub jwt_secret: String,

    /// Session token lifetime (seconds)
    pub token_expiry: u64,

    pub password: PasswordConfig,

    /// Minimum search pattern length
    pub search_min_length: usize,
}

/// Password settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Minimum length in characters
    pub min_length: usize,

    /// bcrypt cost
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite://./users.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry: 86400, // 1 day
            password: PasswordConfig::default(),
            search_min_length: 3,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            bcrypt_cost: 10,
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.accounts.jwt_secret = secret;
        }
        if let Some(expiry) = env_parse("TOKEN_EXPIRY") {
            self.accounts.token_expiry = expiry;
        }
        if let Some(cost) = env_parse("BCRYPT_COST") {
            self.accounts.password.bcrypt_cost = cost;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.server.database_url = url;
        }
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("PORT") {
            self.server.port = port;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
