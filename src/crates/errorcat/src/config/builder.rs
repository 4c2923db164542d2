//! Configuration builder trait

use super::ConfigError;

/// Trait for configuration structures that support building, validation, and merging
///
/// Implementing this trait provides a consistent API for:
/// - Default configuration creation
/// - Validation of configuration values
/// - Loading from environment variables
/// - Merging multiple configuration sources
pub trait ConfigBuilder: Default + Clone {
    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `{PREFIX}{FIELD_NAME}` where FIELD_NAME is
    /// the uppercased field name. Fields without a variable keep their default.
    fn from_env(prefix: &str) -> Result<Self, ConfigError>;

    /// Merge another configuration into this one
    ///
    /// Values from `other` overwrite the ones in `self`. Returns self for
    /// chaining.
    fn merge(&mut self, other: Self) -> &mut Self;

    /// Create, validate, and return the default configuration
    fn build() -> Result<Self, ConfigError> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Load from environment on top of the defaults, and validate
    fn from_env_with_defaults(prefix: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge(Self::from_env(prefix)?);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::env;

    #[test]
    fn test_build_is_default() {
        assert_eq!(Settings::build().unwrap(), Settings::default());
    }

    #[test]
    fn test_merge_overwrites_flags() {
        let mut settings = Settings::default();
        settings.merge(
            Settings::default()
                .with_leak_check(false)
                .with_warn_unguarded(false)
                .with_thread_name("worker"),
        );

        assert!(!settings.leak_check);
        assert!(!settings.warn_unguarded);
        assert_eq!(settings.thread_name, "worker");
    }

    #[test]
    fn test_merge_keeps_thread_name_when_empty() {
        let mut settings = Settings::default().with_thread_name("pool");
        settings.merge(Settings::default().with_thread_name(""));
        assert_eq!(settings.thread_name, "pool");
    }

    #[test]
    fn test_from_env_with_defaults_ignores_empty_name() {
        env::set_var("ERRORCAT_BUILDER_EMPTY_THREAD_NAME", "");
        let settings = Settings::from_env_with_defaults("ERRORCAT_BUILDER_EMPTY_").unwrap();
        assert_eq!(settings.thread_name, "errorcat-go");
        env::remove_var("ERRORCAT_BUILDER_EMPTY_THREAD_NAME");
    }

    #[test]
    fn test_from_env_with_defaults_propagates_errors() {
        env::set_var("ERRORCAT_BUILDER_BAD_LEAK_CHECK", "maybe");
        let result = Settings::from_env_with_defaults("ERRORCAT_BUILDER_BAD_");
        assert_eq!(
            result,
            Err(ConfigError::InvalidBool {
                key: "ERRORCAT_BUILDER_BAD_LEAK_CHECK".to_string(),
                value: "maybe".to_string(),
            })
        );
        env::remove_var("ERRORCAT_BUILDER_BAD_LEAK_CHECK");
    }
}
