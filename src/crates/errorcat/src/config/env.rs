//! Environment variable loading utilities
//!
//! Helper functions for loading and parsing environment variables with proper error handling.

use super::ConfigError;
use std::env;

/// Load an environment variable as a string
///
/// # Returns
///
/// * `Ok(Some(value))` if variable exists
/// * `Ok(None)` if variable doesn't exist
/// * `Err` if variable exists but has invalid UTF-8
pub fn get_env(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidUtf8 {
            key: key.to_string(),
        }),
    }
}

/// Load an environment variable with a default value
pub fn get_env_or(key: &str, default: impl Into<String>) -> Result<String, ConfigError> {
    Ok(get_env(key)?.unwrap_or_else(|| default.into()))
}

/// Load a boolean environment variable
///
/// Recognizes: "true", "1", "yes", "on" (case-insensitive) as true
/// Recognizes: "false", "0", "no", "off" (case-insensitive) as false
///
/// # Returns
///
/// * `Ok(Some(bool))` if variable exists and is a valid boolean
/// * `Ok(None)` if variable doesn't exist
/// * `Err` if variable exists but is not a valid boolean
pub fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match get_env(key)? {
        Some(val) => {
            let result = match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        key: key.to_string(),
                        value: val,
                    })
                }
            };
            Ok(Some(result))
        }
        None => Ok(None),
    }
}

/// Build a prefixed environment variable name
///
/// ```rust
/// use errorcat::config::build_env_key;
///
/// assert_eq!(build_env_key("ERRORCAT_", "leak_check"), "ERRORCAT_LEAK_CHECK");
/// ```
pub fn build_env_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name.to_uppercase())
}
