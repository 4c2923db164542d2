//! Error catching utilities
//!
//! Errors are thrown by unwinding and converted back into ordinary values at a
//! recovery boundary, with annotations added along the way. This removes the
//! error plumbing from every intermediate frame while keeping a plain
//! `Result` at the API surface.
//!
//! # Modules
//!
//! - `error` - The returned [`Error`] value, sentinels, chain helpers
//! - `catch` - The throw operation ([`catch`], [`catch_with`], [`OrThrow`])
//! - `annotate` - Annotation chains applied by boundaries
//! - `recover` - Recovery boundaries ([`recover`], [`scope`], [`guard`])
//! - `context` - [`Context`] tokens that prove a boundary exists
//! - `dispatch` - Guarded work on another thread ([`go`])
//! - `config` - Library settings loaded from the environment
//! - `logging` - Logging of recovered errors
//!
//! # Unchecked mode
//!
//! Set up a boundary, then throw freely below it:
//!
//! ```rust
//! use errorcat::{catch_with, recover, Error};
//!
//! fn on_request(input: &str) -> Result<u32, Error> {
//!     let mut rerr = None;
//!     let value = recover(&mut rerr, ["request failed"], || {
//!         catch_with(input.is_empty(), "empty input");
//!         let parsed = input.parse::<u32>();
//!         catch_with(parsed.as_ref().err().cloned(), "bad number");
//!         Ok(parsed.unwrap_or_default())
//!     });
//!     match rerr {
//!         Some(err) => Err(err),
//!         None => Ok(value.unwrap_or_default()),
//!     }
//! }
//!
//! assert_eq!(on_request("7").unwrap(), 7);
//! assert_eq!(on_request("").unwrap_err().to_string(), "request failed: empty input");
//! ```
//!
//! # Context mode
//!
//! Library code threads a [`Context`] through instead, so throwing outside a
//! boundary cannot be written by accident:
//!
//! ```rust
//! use errorcat::{guard, Context, Error};
//!
//! fn step(ct: &Context, n: u32) {
//!     ct.catch_with(n > 2, format!("step {} is too far", n));
//! }
//!
//! fn my_lib_func() -> Result<(), Error> {
//!     guard(
//!         |ct| {
//!             for n in 0..5 {
//!                 step(ct, n);
//!             }
//!             Ok(())
//!         },
//!         ["my_lib_func failed"],
//!     )
//! }
//!
//! assert_eq!(
//!     my_lib_func().unwrap_err().to_string(),
//!     "my_lib_func failed: step 3 is too far"
//! );
//! ```
//!
//! Throwing relies on unwinding; builds using `panic = "abort"` are not
//! supported.

pub mod annotate;
pub mod catch;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod recover;

#[cfg(test)]
mod testing;

pub use annotate::Annotation;
pub use catch::{catch, catch_with, Condition, OrThrow, Problem, Thrown};
pub use config::{configure, settings, ConfigBuilder, ConfigError, Settings};
pub use context::Context;
pub use dispatch::{go, Pending};
pub use error::{
    format_error_chain, root_cause, BoundaryMisuse, BoxError, CatchMisuse, Error, Result,
};
pub use logging::{log_error, LogLevel};
pub use recover::{guard, is_guarded, recover, scope, Target};

/// Load settings from `ERRORCAT_*` environment variables and install them
pub fn init() -> std::result::Result<(), ConfigError> {
    tracing::debug!("Initializing errorcat");
    configure(Settings::from_env_with_defaults(config::ENV_PREFIX)?)
}

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
