//! Sentinel errors raised by the library itself

use thiserror::Error;

/// Recoverable misuse of the throw operation
///
/// These are thrown like any other error and can be matched with
/// [`Error::matches`](crate::Error::matches) after recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CatchMisuse {
    /// A `true` condition was thrown without describing the problem
    #[error("unknown error")]
    MissingProblem,

    /// The condition was neither a boolean nor an error
    #[error("bad catch usage")]
    BadCondition,
}

/// Fatal misuse of a recovery boundary
///
/// Raised with [`std::panic::panic_any`]. Boundaries never absorb these: they
/// are re-raised until they leave the outermost boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BoundaryMisuse {
    /// The same context was recovered twice
    #[error("[errorcat] duplicate call to recover")]
    DuplicateRecover,

    /// A context was used to throw after its boundary had already run
    #[error("[errorcat] catch was called after recovery")]
    CatchAfterRecover,
}

impl BoundaryMisuse {
    /// Log and raise this fault
    pub(crate) fn raise(self) -> ! {
        tracing::error!(fault = ?self, "{}", self);
        std::panic::panic_any(self)
    }
}
