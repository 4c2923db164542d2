//! The throw operation
//!
//! [`catch`] is "abort on error condition": when the condition is triggered it
//! unwinds the stack up to the nearest recovery boundary, carrying the error
//! in a [`Thrown`] payload.
//!
//! Free functions are the unchecked mode: nothing proves that a boundary
//! exists above the call site. Library code should throw through a
//! [`Context`](crate::Context) instead.
//!
//! # Example
//!
//! ```rust
//! use errorcat::{catch_with, recover, Error};
//!
//! fn write_line(ok: bool) -> Result<(), Error> {
//!     let mut rerr = None;
//!     recover(&mut rerr, ["write failed"], || {
//!         catch_with(!ok, "couldn't write to file");
//!         Ok(())
//!     });
//!     rerr.map_or(Ok(()), Err)
//! }
//!
//! assert!(write_line(true).is_ok());
//! assert_eq!(
//!     write_line(false).unwrap_err().to_string(),
//!     "write failed: couldn't write to file"
//! );
//! ```

use crate::error::{BoxError, CatchMisuse, Error};
use crate::recover;
use std::error::Error as StdError;
use std::fmt;

/// Payload carried by an unwinding throw
///
/// Only the throw operation constructs this. A boundary unwraps it back to
/// its cause.
pub struct Thrown(Error);

impl Thrown {
    /// The thrown error
    pub fn cause(&self) -> &Error {
        &self.0
    }

    /// Consume the payload and return the thrown error
    pub fn into_cause(self) -> Error {
        self.0
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Thrown").field(&self.0).finish()
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Thrown {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

/// The trigger of a throw
#[derive(Debug)]
pub enum Condition {
    /// Throw when `true`
    Flag(bool),
    /// Throw when an error is present
    Failure(Option<Error>),
    /// Anything else; always throws [`CatchMisuse::BadCondition`]
    Unsupported(String),
}

impl Condition {
    /// Build a condition from a value that is neither a flag nor an error
    pub fn unsupported(value: impl fmt::Debug) -> Self {
        Self::Unsupported(format!("{:?}", value))
    }

    /// Build a condition from a result whose error is boxed
    ///
    /// `Box<dyn Error + Send + Sync>` does not implement `Error`, so such
    /// results cannot convert through `From`.
    ///
    /// ```rust
    /// use errorcat::{catch_with, scope, BoxError, Condition};
    ///
    /// let result: Result<(), BoxError> = Err("boom".into());
    /// let err = scope(
    ///     || {
    ///         catch_with(Condition::boxed(result), "loading");
    ///         Ok(())
    ///     },
    ///     errorcat::annotations![],
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.to_string(), "loading: boom");
    /// ```
    pub fn boxed<T>(result: Result<T, BoxError>) -> Self {
        Self::Failure(result.err().map(Error::from_boxed))
    }
}

impl From<bool> for Condition {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Error> for Condition {
    fn from(err: Error) -> Self {
        Self::Failure(Some(err))
    }
}

impl From<BoxError> for Condition {
    fn from(err: BoxError) -> Self {
        Self::Failure(Some(Error::from_boxed(err)))
    }
}

impl<E> From<Option<E>> for Condition
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: Option<E>) -> Self {
        Self::Failure(err.map(Error::new))
    }
}

impl<T, E> From<Result<T, E>> for Condition
where
    E: StdError + Send + Sync + 'static,
{
    fn from(result: Result<T, E>) -> Self {
        Self::Failure(result.err().map(Error::new))
    }
}

macro_rules! unsupported_condition {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Condition {
                fn from(value: $ty) -> Self {
                    Self::Unsupported(value.to_string())
                }
            }
        )*
    };
}

unsupported_condition!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, &str,
    String,
);

/// Description attached to a thrown error
#[derive(Debug, Default)]
pub enum Problem {
    /// No description
    #[default]
    None,
    /// Text description
    Text(String),
    /// Error description
    Error(Error),
}

impl Problem {
    /// Describe the problem with an arbitrary error
    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Error(Error::new(error))
    }
}

impl From<&str> for Problem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Problem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        Self::Error(err)
    }
}

impl From<BoxError> for Problem {
    fn from(err: BoxError) -> Self {
        Self::Error(Error::from_boxed(err))
    }
}

impl From<CatchMisuse> for Problem {
    fn from(misuse: CatchMisuse) -> Self {
        Self::Error(misuse.into())
    }
}

/// Resolve a condition and problem into the error to propagate, if any
pub(crate) fn triggered(condition: Condition, problem: Problem) -> Option<Error> {
    match condition {
        Condition::Flag(false) | Condition::Failure(None) => None,
        Condition::Failure(Some(err)) => Some(describe_failure(err, problem)),
        Condition::Flag(true) => Some(describe_flag(problem)),
        Condition::Unsupported(value) => Some(Error::join(
            CatchMisuse::BadCondition.into(),
            Error::msg(format!("unknown catch condition type: {}", value)),
        )),
    }
}

fn describe_failure(err: Error, problem: Problem) -> Error {
    match problem {
        Problem::None => err,
        Problem::Text(text) => err.context(text),
        Problem::Error(outer) => Error::join(outer, err),
    }
}

fn describe_flag(problem: Problem) -> Error {
    match problem {
        Problem::None => CatchMisuse::MissingProblem.into(),
        Problem::Text(text) => Error::msg(text),
        Problem::Error(err) => err,
    }
}

/// Unwind to the nearest boundary carrying `err`
pub(crate) fn throw(err: Error) -> ! {
    if !recover::is_guarded() && crate::config::settings().warn_unguarded {
        tracing::warn!(error = %err, "error thrown with no recovery boundary on this thread");
    }
    std::panic::resume_unwind(Box::new(Thrown(err)))
}

/// Throw if `condition` is triggered
///
/// - `false` and absent errors return normally
/// - an error is thrown unchanged
/// - `true` throws [`CatchMisuse::MissingProblem`]; use [`catch_with`] to
///   describe it
/// - any other value throws [`CatchMisuse::BadCondition`]
pub fn catch(condition: impl Into<Condition>) {
    catch_with(condition, Problem::None)
}

/// Throw if `condition` is triggered, described by `problem`
///
/// When the condition is an error, the problem annotates it: a text problem
/// renders as `"{problem}: {error}"`, an error problem is joined with the
/// condition so that both can be matched. When the condition is `true`, the
/// problem alone is thrown.
pub fn catch_with(condition: impl Into<Condition>, problem: impl Into<Problem>) {
    if let Some(err) = triggered(condition.into(), problem.into()) {
        throw(err);
    }
}

/// Throwing accessors for fallible values
///
/// # Example
///
/// ```rust
/// use errorcat::{scope, OrThrow};
///
/// let result = scope(
///     || {
///         let port = "80a".parse::<u16>().or_throw_with("invalid port");
///         assert_eq!(port, 80);
///         Ok(())
///     },
///     ["loading config"],
/// );
/// assert_eq!(
///     result.unwrap_err().to_string(),
///     "loading config: invalid port: invalid digit found in string"
/// );
/// ```
pub trait OrThrow<T> {
    /// Return the value, or throw the error
    fn or_throw(self) -> T;

    /// Return the value, or throw the error described by `problem`
    fn or_throw_with(self, problem: impl Into<Problem>) -> T;
}

impl<T, E> OrThrow<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn or_throw(self) -> T {
        self.or_throw_with(Problem::None)
    }

    fn or_throw_with(self, problem: impl Into<Problem>) -> T {
        match self {
            Ok(value) => value,
            Err(err) => throw_failure(Error::new(err), problem.into()),
        }
    }
}

impl<T> OrThrow<T> for Option<T> {
    fn or_throw(self) -> T {
        self.or_throw_with(Problem::None)
    }

    fn or_throw_with(self, problem: impl Into<Problem>) -> T {
        match self {
            Some(value) => value,
            None => throw_flag(problem.into()),
        }
    }
}

pub(crate) fn throw_failure(err: Error, problem: Problem) -> ! {
    throw(describe_failure(err, problem))
}

pub(crate) fn throw_flag(problem: Problem) -> ! {
    throw(describe_flag(problem))
}
