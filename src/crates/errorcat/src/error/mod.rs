//! The error value returned by recovery boundaries
//!
//! An [`Error`] is an opaque tree of causes. Thrown errors, descriptions and
//! annotations all end up as nodes of this tree, so a boundary can hand back a
//! single value that still matches every error it was built from.
//!
//! # Rendering
//!
//! Layers are joined with `": "`, outermost first:
//!
//! ```rust
//! use errorcat::Error;
//!
//! let err = Error::msg("bad condition").context("first").context("second");
//! assert_eq!(err.to_string(), "second: first: bad condition");
//! ```
//!
//! # Matching
//!
//! - [`Error::is`] / [`Error::find`] look for an error type anywhere in the tree
//! - [`Error::matches`] compares against a specific value (sentinel matching)
//! - [`Error::downcast`] recovers a foreign error that was thrown unannotated

mod chain;
mod sentinel;

pub use chain::{format_error_chain, root_cause, Chain};
pub use sentinel::{BoundaryMisuse, CatchMisuse};

use std::error::Error as StdError;
use std::fmt;

/// Boxed foreign error stored inside an [`Error`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for guarded operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced by a recovery boundary
pub struct Error {
    repr: Box<Repr>,
}

#[derive(Debug)]
pub(crate) enum Repr {
    /// Any other error, kept verbatim
    Foreign(BoxError),
    /// Plain description
    Message(String),
    /// `"{note}: {source}"`
    Context { note: String, source: Error },
    /// `"{outer}: {inner}"` where both sides stay matchable
    Join { outer: Error, inner: Error },
}

impl Error {
    fn from_repr(repr: Repr) -> Self {
        Self {
            repr: Box::new(repr),
        }
    }

    /// Wrap any error
    ///
    /// Passing an [`Error`] returns it unchanged rather than nesting it.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(error))
    }

    /// Wrap an already boxed error
    ///
    /// Use this (or `From`) for errors that only exist boxed, such as
    /// `Box<dyn Error + Send + Sync>` results or `anyhow::Error` converted
    /// with `into()`.
    ///
    /// ```rust
    /// use errorcat::{BoxError, Error};
    ///
    /// let boxed: BoxError = "connection reset".into();
    /// assert_eq!(Error::from_boxed(boxed).to_string(), "connection reset");
    /// ```
    pub fn from_boxed(error: BoxError) -> Self {
        match error.downcast::<Error>() {
            Ok(err) => *err,
            Err(error) => Self::from_repr(Repr::Foreign(error)),
        }
    }

    /// Create an error from a description
    pub fn msg(message: impl Into<String>) -> Self {
        Self::from_repr(Repr::Message(message.into()))
    }

    /// Prefix this error with a description
    pub fn context(self, note: impl Into<String>) -> Self {
        Self::from_repr(Repr::Context {
            note: note.into(),
            source: self,
        })
    }

    /// Join two errors so that both can be matched
    ///
    /// Renders as `"{outer}: {inner}"`.
    pub fn join(outer: Error, inner: Error) -> Self {
        Self::from_repr(Repr::Join { outer, inner })
    }

    pub(crate) fn repr(&self) -> &Repr {
        &self.repr
    }

    /// Walk every error contained in this one, outermost first
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Whether an error of type `T` appears anywhere in the tree
    pub fn is<T>(&self) -> bool
    where
        T: StdError + 'static,
    {
        self.find::<T>().is_some()
    }

    /// Find the first error of type `T` in the tree
    pub fn find<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.chain().find_map(|e| e.downcast_ref::<T>())
    }

    /// Whether `target` appears anywhere in the tree
    ///
    /// # Example
    ///
    /// ```rust
    /// use errorcat::{CatchMisuse, Error};
    ///
    /// let err = Error::new(CatchMisuse::MissingProblem).context("loading");
    /// assert!(err.matches(&CatchMisuse::MissingProblem));
    /// assert!(!err.matches(&CatchMisuse::BadCondition));
    /// ```
    pub fn matches<T>(&self, target: &T) -> bool
    where
        T: StdError + PartialEq + 'static,
    {
        self.chain()
            .filter_map(|e| e.downcast_ref::<T>())
            .any(|e| e == target)
    }

    /// Borrow the wrapped error if this is an unannotated `T`
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        match &*self.repr {
            Repr::Foreign(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take back the wrapped error if this is an unannotated `T`
    pub fn downcast<T>(self) -> std::result::Result<T, Self>
    where
        T: StdError + 'static,
    {
        match *self.repr {
            Repr::Foreign(inner) => match inner.downcast::<T>() {
                Ok(err) => Ok(*err),
                Err(inner) => Err(Self::from_repr(Repr::Foreign(inner))),
            },
            repr => Err(Self::from_repr(repr)),
        }
    }

    /// The innermost cause along the `source()` chain
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        root_cause(self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.repr {
            Repr::Foreign(inner) => fmt::Display::fmt(inner, f),
            Repr::Message(message) => f.write_str(message),
            Repr::Context { note, source } => write!(f, "{}: {}", note, source),
            Repr::Join { outer, inner } => write!(f, "{}: {}", outer, inner),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return fmt::Debug::fmt(&self.repr, f);
        }
        write!(f, "Error({:?})", self.to_string())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &*self.repr {
            Repr::Foreign(inner) => inner.source(),
            Repr::Message(_) => None,
            Repr::Context { source, .. } => Some(source),
            Repr::Join { inner, .. } => Some(inner),
        }
    }
}

impl From<CatchMisuse> for Error {
    fn from(misuse: CatchMisuse) -> Self {
        Self::new(misuse)
    }
}

impl From<BoxError> for Error {
    fn from(error: BoxError) -> Self {
        Self::from_boxed(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("service error")]
    struct ServiceError;

    #[test]
    fn test_new_does_not_nest() {
        let err = Error::new(Error::msg("inner"));
        assert!(matches!(err.repr(), Repr::Message(_)));
    }

    #[test]
    fn test_context_rendering() {
        let err = Error::msg("bad condition").context("first").context("second");
        assert_eq!(err.to_string(), "second: first: bad condition");
    }

    #[test]
    fn test_join_matches_both_sides() {
        let err = Error::join(
            Error::new(ServiceError),
            Error::new(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")),
        );

        assert_eq!(err.to_string(), "service error: pipe closed");
        assert!(err.matches(&ServiceError));
        assert!(err.is::<io::Error>());
        assert_eq!(
            err.find::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn test_downcast_roundtrip() {
        let err = Error::new(ServiceError);
        assert_eq!(err.downcast_ref::<ServiceError>(), Some(&ServiceError));
        assert_eq!(err.downcast::<ServiceError>().ok(), Some(ServiceError));
    }

    #[test]
    fn test_downcast_annotated_fails() {
        let err = Error::new(ServiceError).context("loading");
        let err = err.downcast::<ServiceError>().unwrap_err();
        assert_eq!(err.to_string(), "loading: service error");
        assert!(err.matches(&ServiceError));
    }

    #[test]
    fn test_source_follows_inner() {
        let err = Error::msg("cause").context("note");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "cause");
        assert_eq!(err.root_cause().to_string(), "cause");
    }

    #[test]
    fn test_debug_formats() {
        let err = Error::msg("boom").context("outer");
        assert_eq!(format!("{:?}", err), "Error(\"outer: boom\")");
        assert!(format!("{:#?}", err).contains("Context"));
    }
}
