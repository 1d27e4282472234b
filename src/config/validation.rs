use crate::config::types::{Config, CrawlerConfig, FilterConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_filters(&config.filters)?;
    Ok(())
}

/// Validates crawler limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_secs must be >= 1, got {}",
            config.page_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates include/exclude patterns
///
/// An empty pattern would be a substring of every link, which silently turns
/// an exclude list into "exclude everything".
fn validate_filters(config: &FilterConfig) -> Result<(), ConfigError> {
    for pattern in config.include.iter().chain(config.exclude.iter()) {
        if pattern.is_empty() {
            return Err(ConfigError::Validation(
                "filter patterns cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
