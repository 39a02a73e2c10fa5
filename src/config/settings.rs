//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub hosting: HostingConfig,
    pub discovery: DiscoveryConfig,
    pub push: PushConfig,
    pub catalog: CatalogConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub statement_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

/// Hosting quota: how many events a user may host per refresh window
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct HostingConfig {
    pub max_count: i32,
    pub refresh_period_minutes: i64,
}

/// Discovery paging bounds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

/// Push delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub server_key: String,
    pub timeout_seconds: u64,
}

/// Sports catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a named file (extension optional), layered over defaults
    pub fn from_file(name: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("KICKABOUT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::KickaboutError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/kickabout".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                statement_timeout_seconds: 3,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "./logs".to_string(),
                file_prefix: "kickabout.log".to_string(),
                json: false,
            },
            hosting: HostingConfig {
                max_count: 3,
                refresh_period_minutes: 1440,
            },
            discovery: DiscoveryConfig {
                default_page_size: 20,
                max_page_size: 100,
            },
            push: PushConfig {
                enabled: false,
                endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
                server_key: String::new(),
                timeout_seconds: 5,
            },
            catalog: CatalogConfig {
                path: "./data/available_sports_detail.json".to_string(),
            },
        }
    }
}
