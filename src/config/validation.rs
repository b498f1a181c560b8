use crate::config::types::{
    ApiConfig, CleaningConfig, Config, DatabaseConfig, FetchConfig, OutputConfig, QueryPolicy,
};
use crate::ConfigError;
use url::Url;

/// Largest page the volumes endpoint will return
pub const MAX_PAGE_SIZE: u32 = 40;

/// Largest `startIndex` the volumes endpoint serves per query
pub const MAX_START_INDEX: u32 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_cleaning_config(&config.cleaning)?;
    validate_database_config(&config.database)?;
    Ok(())
}

/// Validates the API endpoint section
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "key_env cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.max_offset < 1 || config.max_offset > MAX_START_INDEX {
        return Err(ConfigError::Validation(format!(
            "max_offset must be between 1 and {}, got {}",
            MAX_START_INDEX, config.max_offset
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the fetch loop section
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.target_count < 1 {
        return Err(ConfigError::Validation(format!(
            "target_count must be >= 1, got {}",
            config.target_count
        )));
    }

    if config.query_policy == QueryPolicy::Topics {
        if config.topics.is_empty() {
            return Err(ConfigError::Validation(
                "topics cannot be empty when query_policy is 'topics'".to_string(),
            ));
        }

        if config.topics.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "topics cannot contain blank entries".to_string(),
            ));
        }
    }

    if config.max_empty_queries < 1 {
        return Err(ConfigError::Validation(
            "max_empty_queries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the raw output section
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.raw_directory.is_empty() {
        return Err(ConfigError::Validation(
            "raw_directory cannot be empty".to_string(),
        ));
    }

    if config.raw_base_filename.is_empty() {
        return Err(ConfigError::Validation(
            "raw_base_filename cannot be empty".to_string(),
        ));
    }

    if config.raw_base_filename.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "raw_base_filename must be a bare file name, got '{}'",
            config.raw_base_filename
        )));
    }

    if config.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "log_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the cleaning section
fn validate_cleaning_config(config: &CleaningConfig) -> Result<(), ConfigError> {
    if config.input_directory.is_empty() {
        return Err(ConfigError::Validation(
            "input_directory cannot be empty".to_string(),
        ));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
