//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{KickaboutError, Result};
use super::Settings;

/// One year
const MAX_REFRESH_PERIOD_MINUTES: i64 = 365 * 24 * 60;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_hosting_config(&settings.hosting)?;
    validate_discovery_config(&settings.discovery)?;
    validate_push_config(&settings.push)?;
    validate_catalog_config(&settings.catalog)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(KickaboutError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(KickaboutError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(KickaboutError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(KickaboutError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(KickaboutError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate hosting quota configuration
fn validate_hosting_config(config: &super::HostingConfig) -> Result<()> {
    if config.max_count <= 0 {
        return Err(KickaboutError::Config(
            "Hosting max count must be greater than 0".to_string()
        ));
    }

    if config.refresh_period_minutes <= 0 {
        return Err(KickaboutError::Config(
            "Hosting refresh period must be greater than 0".to_string()
        ));
    }

    if config.refresh_period_minutes > MAX_REFRESH_PERIOD_MINUTES {
        return Err(KickaboutError::Config(format!(
            "Hosting refresh period cannot exceed {} minutes",
            MAX_REFRESH_PERIOD_MINUTES
        )));
    }

    Ok(())
}

/// Validate discovery paging configuration
fn validate_discovery_config(config: &super::DiscoveryConfig) -> Result<()> {
    if config.default_page_size <= 0 || config.max_page_size <= 0 {
        return Err(KickaboutError::Config(
            "Page sizes must be greater than 0".to_string()
        ));
    }

    if config.default_page_size > config.max_page_size {
        return Err(KickaboutError::Config(
            "Default page size cannot be greater than max page size".to_string()
        ));
    }

    Ok(())
}

/// Validate push configuration
fn validate_push_config(config: &super::PushConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    url::Url::parse(&config.endpoint)
        .map_err(|e| KickaboutError::Config(format!("Invalid push endpoint: {}", e)))?;

    if config.server_key.is_empty() {
        return Err(KickaboutError::Config(
            "Push server key is required when push is enabled".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(KickaboutError::Config(
            "Push timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate sports catalog configuration
fn validate_catalog_config(config: &super::CatalogConfig) -> Result<()> {
    if config.path.is_empty() {
        return Err(KickaboutError::Config(
            "Sports catalog path is required".to_string()
        ));
    }

    Ok(())
}
