//! Library settings
//!
//! The library keeps a small process-wide [`Settings`] value that controls
//! its diagnostics and the dispatch helper. Settings can be installed
//! directly with [`configure`] or loaded from the environment with
//! [`init`](crate::init):
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `ERRORCAT_LEAK_CHECK` | `true` | warn when a context is dropped without being recovered |
//! | `ERRORCAT_WARN_UNGUARDED` | `true` | warn when throwing with no boundary on the thread |
//! | `ERRORCAT_THREAD_NAME` | `errorcat-go` | name of threads spawned by [`go`](crate::go) |
//!
//! # Example
//!
//! ```rust
//! use errorcat::config::{configure, settings, Settings};
//!
//! configure(Settings::default().with_leak_check(false)).unwrap();
//! assert!(!settings().leak_check);
//! ```

mod builder;
mod env;

pub use builder::ConfigBuilder;
pub use env::{build_env_key, get_env, get_env_bool, get_env_or};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment prefix used by [`init`](crate::init)
pub const ENV_PREFIX: &str = "ERRORCAT_";

/// Errors raised while loading or validating settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Variable is not valid UTF-8
    #[error("Environment variable {key} contains invalid UTF-8")]
    InvalidUtf8 { key: String },

    /// Variable is not a recognized boolean
    #[error("Invalid boolean value for {key}: {value}")]
    InvalidBool { key: String, value: String },

    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Process-wide library settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Warn when a context is dropped without its boundary having run
    pub leak_check: bool,
    /// Warn when an error is thrown with no boundary on the current thread
    pub warn_unguarded: bool,
    /// Name given to threads spawned by [`go`](crate::go)
    pub thread_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            leak_check: true,
            warn_unguarded: true,
            thread_name: "errorcat-go".to_string(),
        }
    }
}

impl Settings {
    /// Set the leak check
    pub fn with_leak_check(mut self, enabled: bool) -> Self {
        self.leak_check = enabled;
        self
    }

    /// Set the unguarded throw warning
    pub fn with_warn_unguarded(mut self, enabled: bool) -> Self {
        self.warn_unguarded = enabled;
        self
    }

    /// Set the dispatch thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

impl ConfigBuilder for Settings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name.is_empty() {
            return Err(ConfigError::Invalid("thread_name must not be empty".into()));
        }
        if self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid(
                "thread_name must not contain NUL bytes".into(),
            ));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            leak_check: get_env_bool(&build_env_key(prefix, "leak_check"))?
                .unwrap_or(defaults.leak_check),
            warn_unguarded: get_env_bool(&build_env_key(prefix, "warn_unguarded"))?
                .unwrap_or(defaults.warn_unguarded),
            thread_name: get_env_or(&build_env_key(prefix, "thread_name"), defaults.thread_name)?,
        })
    }

    fn merge(&mut self, other: Self) -> &mut Self {
        self.leak_check = other.leak_check;
        self.warn_unguarded = other.warn_unguarded;
        if !other.thread_name.is_empty() {
            self.thread_name = other.thread_name;
        }
        self
    }
}

static SETTINGS: RwLock<Option<Settings>> = parking_lot::const_rwlock(None);

/// Snapshot of the current settings
pub fn settings() -> Settings {
    SETTINGS.read().clone().unwrap_or_default()
}

/// Validate and install `settings` process-wide
pub fn configure(settings: Settings) -> Result<(), ConfigError> {
    settings.validate()?;
    tracing::debug!(?settings, "errorcat settings updated");
    *SETTINGS.write() = Some(settings);
    Ok(())
}
