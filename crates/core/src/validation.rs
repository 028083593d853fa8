//! Configuration validation support

use config::ConfigError;
use serde::{Deserialize, Serialize};

/// Trait for validating configuration values
pub trait ValidateConfig: Serialize + for<'de> Deserialize<'de> {
    /// Validate the configuration
    ///
    /// Returns Ok(()) if valid, or an error describing what's wrong
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Common validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        validate_not_empty(url, field)?;
        url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        Ok(())
    }

    /// Validate an absolute client route such as `/login`
    pub fn validate_route(route: &str, field: &str) -> Result<(), ConfigError> {
        if !route.starts_with('/') || route.contains(char::is_whitespace) {
            return Err(ConfigError::Message(format!(
                "{field}: route must be an absolute path"
            )));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max {
            return Err(ConfigError::Message(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;

    #[test]
    fn routes_must_be_absolute() {
        assert!(validate_route("/login", "r").is_ok());
        assert!(validate_route("/", "r").is_ok());
        assert!(validate_route("login", "r").is_err());
        assert!(validate_route("/log in", "r").is_err());
    }

    #[test]
    fn urls_are_parsed() {
        assert!(validate_url("https://abc.supabase.co", "u").is_ok());
        assert!(validate_url("not a url", "u").is_err());
        assert!(validate_url("  ", "u").is_err());
    }

    #[test]
    fn range_is_inclusive() {
        assert!(validate_range(1, 1, 3, "n").is_ok());
        assert!(validate_range(3, 1, 3, "n").is_ok());
        assert!(validate_range(0, 1, 3, "n").is_err());
    }
}
