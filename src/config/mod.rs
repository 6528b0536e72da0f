//! Configuration management
//!
//! Values are layered: built-in defaults, then an optional
//! `config/default.toml`, then `APP_*` environment variables (`__` separates
//! nesting levels, e.g. `APP_SERVER__PORT`), and finally the plain `PORT` and
//! `APP_ENV` variables.

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Deployment environment name ("development", "production", ...)
    pub env: String,
    pub database: DatabaseSettings,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            env: "development".to_string(),
            database: DatabaseSettings::default(),
            security: SecurityConfig {
                bcrypt_cost: 10,
            },
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: "postgres://postgres@localhost/users".to_string(),
            max_connections: 10,
        }
    }
}

impl Config {
    /// Load configuration from every source
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
    }

    fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("env", defaults.env)?
            .set_default("database.backend", "memory")?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("security.bcrypt_cost", defaults.security.bcrypt_cost)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(environment)
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("env", std::env::var("APP_ENV").ok())?
            .build()?
            .try_deserialize()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
