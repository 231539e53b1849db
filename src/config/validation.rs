use crate::config::types::{
    CheckpointConfig, Config, FilterConfig, HttpConfig, RetryConfig, ScrapabilityConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_retry_config(&config.retry)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_scrapability_config(&config.scrapability)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 60 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 60, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > 60 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and 60, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "backoff_ms must be <= 60000ms, got {}ms",
            config.backoff_ms
        )));
    }

    Ok(())
}

/// Validates checkpoint configuration
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint directory cannot be empty".to_string(),
        ));
    }

    if config.interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint interval must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates batch scrapability checker configuration
fn validate_scrapability_config(config: &ScrapabilityConfig) -> Result<(), ConfigError> {
    if config.workers == Some(0) {
        return Err(ConfigError::Validation(
            "workers must be >= 1 when set".to_string(),
        ));
    }

    if config.task_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "task_timeout_secs must be >= 1, got {}",
            config.task_timeout_secs
        )));
    }

    if config.robots_user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots_user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the email denylist
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    // An empty entry would match (and drop) every address
    if config.denylist.iter().any(|entry| entry.is_empty()) {
        return Err(ConfigError::Validation(
            "denylist entries cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(validate(&config).is_err());

        config.http.timeout_secs = 61;
        assert!(validate(&config).is_err());

        config.http.timeout_secs = 5;
        config.http.connect_timeout_secs = 0;
        assert!(validate(&config).is_err());

        // A connect timeout above the request timeout is capped, not rejected
        config.http.connect_timeout_secs = 8;
        assert!(validate(&config).is_ok());
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_retry() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(validate(&config).is_err());

        config.retry.max_attempts = 1;
        config.retry.backoff_ms = 120_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_checkpoint_interval() {
        let mut config = Config::default();
        config.checkpoint.interval = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_workers() {
        let mut config = Config::default();
        config.scrapability.workers = Some(0);
        assert!(validate(&config).is_err());

        config.scrapability.workers = Some(2);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_denylist_entry() {
        let mut config = Config::default();
        config.filter.denylist.push(String::new());
        assert!(validate(&config).is_err());
    }
}
