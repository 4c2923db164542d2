//! Error chain walking and formatting

use super::{Error, Repr};
use std::error::Error as StdError;

/// Depth-first iterator over every error contained in an [`Error`]
///
/// Joined errors yield their outer side before their inner side. Foreign
/// errors are followed through their own `source()` chain.
pub struct Chain<'a> {
    stack: Vec<&'a (dyn StdError + 'static)>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(error: &'a Error) -> Self {
        Self {
            stack: vec![error as &(dyn StdError + 'static)],
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        let Some(error) = current.downcast_ref::<Error>() else {
            if let Some(source) = current.source() {
                self.stack.push(source);
            }
            return Some(current);
        };

        match error.repr() {
            Repr::Foreign(inner) => {
                let inner: &(dyn StdError + 'static) = inner.as_ref();
                if let Some(source) = inner.source() {
                    self.stack.push(source);
                }
                Some(inner)
            }
            Repr::Message(_) => Some(current),
            Repr::Context { source, .. } => {
                self.stack.push(source);
                Some(current)
            }
            Repr::Join { outer, inner } => {
                self.stack.push(inner);
                self.stack.push(outer);
                Some(current)
            }
        }
    }
}

/// Format an error chain as a multi-line string
///
/// Walks the error chain via `source()` and formats each error
/// on a separate line with indentation.
///
/// # Example
///
/// ```rust
/// use errorcat::{format_error_chain, Error};
///
/// let err = Error::msg("disk full").context("saving settings");
/// assert_eq!(
///     format_error_chain(&err),
///     "Error: saving settings: disk full\n  Caused by: disk full"
/// );
/// ```
pub fn format_error_chain(error: &dyn StdError) -> String {
    let mut result = format!("Error: {}", error);
    let mut current = error.source();
    let mut level = 1;

    while let Some(source) = current {
        result.push_str(&format!("\n{:indent$}Caused by: {}", "", source, indent = level * 2));
        current = source.source();
        level += 1;
    }

    result
}

/// Get the root cause of an error chain
///
/// Walks the error chain via `source()` until reaching the bottom.
pub fn root_cause<'a>(error: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}
