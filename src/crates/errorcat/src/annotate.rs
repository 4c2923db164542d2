//! Annotation chains applied by recovery boundaries
//!
//! A boundary runs its annotations left to right over the captured error:
//!
//! - [`Annotation::Text`] prefixes the error: `"{text}: {error}"`
//! - [`Annotation::Companion`] joins an error in front so both can be matched
//! - [`Annotation::Transform`] replaces the error; returning `None` marks it
//!   handled and stops the chain
//!
//! Plain strings and [`Error`] values convert into annotations, so a
//! homogeneous list can be passed directly. Mixed lists use [`annotations!`].
//!
//! [`annotations!`]: crate::annotations

use crate::error::{BoxError, Error};
use std::error::Error as StdError;
use std::fmt;

/// Handler that consumes an error and may replace or clear it
pub type TransformFn = Box<dyn FnOnce(Error) -> Option<Error> + Send>;

/// A single step of an annotation chain
pub enum Annotation {
    /// Prefix the error with a description
    Text(String),
    /// Join a companion error in front of the captured one
    Companion(Error),
    /// Transform or handle the error
    Transform(TransformFn),
}

impl Annotation {
    /// Description annotation
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Companion error annotation
    pub fn companion<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Companion(Error::new(error))
    }

    /// Transform annotation
    ///
    /// Returning `None` clears the error and skips the rest of the chain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use errorcat::{annotations, catch_with, scope, Annotation};
    ///
    /// let result = scope(
    ///     || {
    ///         catch_with(true, "not found");
    ///         Ok(())
    ///     },
    ///     annotations![
    ///         "lookup",
    ///         Annotation::transform(|err| {
    ///             // Handled here, nothing is returned to the caller.
    ///             println!("{}", err);
    ///             None
    ///         }),
    ///     ],
    /// );
    /// assert!(result.is_ok());
    /// ```
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(Error) -> Option<Error> + Send + 'static,
    {
        Self::Transform(Box::new(f))
    }

    /// Apply this step
    fn apply(self, err: Error) -> Option<Error> {
        match self {
            Self::Text(text) => Some(err.context(text)),
            Self::Companion(companion) => Some(Error::join(companion, err)),
            Self::Transform(f) => f(err),
        }
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Companion(err) => f.debug_tuple("Companion").field(err).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

impl From<&str> for Annotation {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Annotation {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Error> for Annotation {
    fn from(err: Error) -> Self {
        Self::Companion(err)
    }
}

impl From<BoxError> for Annotation {
    fn from(err: BoxError) -> Self {
        Self::Companion(Error::from_boxed(err))
    }
}

/// Build a `Vec<Annotation>` from values of mixed kinds
///
/// ```rust
/// use errorcat::{annotations, Annotation, Error};
///
/// let chain = annotations![
///     "first",
///     Error::msg("companion"),
///     Annotation::transform(Some),
/// ];
/// assert_eq!(chain.len(), 3);
///
/// let empty = annotations![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! annotations {
    () => {
        ::std::vec::Vec::<$crate::Annotation>::new()
    };
    ($($annotation:expr),+ $(,)?) => {
        ::std::vec![$($crate::Annotation::from($annotation)),+]
    };
}

/// Collect annotations from any iterable of convertible values
pub(crate) fn collect<A>(annotations: A) -> Vec<Annotation>
where
    A: IntoIterator,
    A::Item: Into<Annotation>,
{
    annotations.into_iter().map(Into::into).collect()
}

/// Run `chain` over `err`, left to right
///
/// Stops at the first transform that returns `None`.
pub(crate) fn apply_chain(err: Error, chain: Vec<Annotation>) -> Option<Error> {
    let mut current = err;
    for annotation in chain {
        current = annotation.apply(current)?;
    }
    Some(current)
}
