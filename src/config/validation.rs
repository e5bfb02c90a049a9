use super::models::{CacheBackend, Config};
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("HTTP timeout must be positive")]
    ZeroTimeout,

    #[error("HTTP user agent must not be empty")]
    EmptyUserAgent,

    #[error("Custom provider #{index} has an empty endpoint")]
    EmptyEndpoint { index: usize },

    #[error("Custom provider #{index} has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        reason: String,
    },

    #[error("Cache backend is fjall but no path is configured")]
    MissingCachePath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_http(config)?;
    validate_custom_providers(config)?;
    validate_cache(config)?;
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout);
    }

    if config.http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    Ok(())
}

/// Custom patterns must compile the way the registry compiles them
fn validate_custom_providers(config: &Config) -> Result<(), ValidationError> {
    for (index, custom) in config.providers.custom.iter().enumerate() {
        if custom.endpoint.trim().is_empty() {
            return Err(ValidationError::EmptyEndpoint { index });
        }

        if custom.pattern.is_empty() {
            return Err(ValidationError::InvalidPattern {
                index,
                pattern: custom.pattern.clone(),
                reason: "pattern is empty".to_string(),
            });
        }

        if let Err(e) = Regex::new(&format!("^(?:{})", custom.pattern)) {
            return Err(ValidationError::InvalidPattern {
                index,
                pattern: custom.pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_cache(config: &Config) -> Result<(), ValidationError> {
    if config.cache.backend == CacheBackend::Fjall && config.cache.path.as_os_str().is_empty() {
        return Err(ValidationError::MissingCachePath);
    }

    Ok(())
}
