//! Logging helpers for recovered errors
//!
//! Boundaries often sit at the top of a request or task, which is where errors
//! get logged. [`Annotation::log`] does that as a step of the chain and passes
//! the error through unchanged.

use crate::annotate::Annotation;
use crate::error::{format_error_chain, Error};
use tracing::{debug, error, info, warn};

/// Log levels for custom logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

/// Log `err` with its full cause chain at `level`
pub fn log_error(err: &Error, level: LogLevel) {
    let chain = format_error_chain(err);
    match level {
        LogLevel::Debug => debug!(error = %err, "{}", chain),
        LogLevel::Info => info!(error = %err, "{}", chain),
        LogLevel::Warn => warn!(error = %err, "{}", chain),
        LogLevel::Error => error!(error = %err, "{}", chain),
    }
}

impl Annotation {
    /// Log the error at `level` and pass it on unchanged
    ///
    /// # Example
    ///
    /// ```rust
    /// use errorcat::{annotations, catch_with, scope, Annotation, LogLevel};
    ///
    /// let err = scope(
    ///     || {
    ///         catch_with(true, "disk full");
    ///         Ok(())
    ///     },
    ///     annotations!["saving", Annotation::log(LogLevel::Warn)],
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.to_string(), "saving: disk full");
    /// ```
    pub fn log(level: LogLevel) -> Self {
        Self::transform(move |err| {
            log_error(&err, level);
            Some(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::apply_chain;

    #[test]
    fn test_log_passes_through() {
        let err = apply_chain(
            Error::msg("cause"),
            vec![Annotation::log(LogLevel::Info), Annotation::text("after")],
        )
        .unwrap();
        assert_eq!(err.to_string(), "after: cause");
    }

    #[test]
    fn test_log_error_every_level() {
        let err = Error::msg("cause").context("note");
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            log_error(&err, level);
        }
        assert_eq!(LogLevel::default(), LogLevel::Error);
    }
}
