//! Guarded contexts
//!
//! Library code should not let throws escape past its own API. A [`Context`]
//! makes that checkable: it is created together with its boundary, and code
//! that needs to throw takes the context as a parameter instead of calling the
//! free [`catch`](crate::catch) functions. Holding a context is proof that a
//! boundary sits above the call site.
//!
//! A context is neither `Send` nor `Sync`, so it cannot leave the thread its
//! boundary runs on. [`go`](crate::go) creates a fresh one on the worker
//! thread.
//!
//! # Example
//!
//! ```rust
//! use errorcat::{recover, Context, Error};
//!
//! fn unsafe_function(ct: &Context) {
//!     ct.catch_with(Some(Error::msg("this is an error")), "caught the err");
//!     println!("this won't be printed");
//! }
//!
//! let ct = Context::new();
//! // The boundary must be set up right where the context is created.
//! recover(&ct, ["test"], || {
//!     unsafe_function(&ct);
//!     Ok(())
//! });
//!
//! let err = ct.take_error().unwrap();
//! assert_eq!(err.to_string(), "test: caught the err: this is an error");
//! ```

use crate::catch::{self, Condition, Problem};
use crate::error::{BoundaryMisuse, Error};
use std::cell::{Cell, RefCell};
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

/// Capability token bound to one recovery boundary
///
/// Clones share the same slot and state.
#[derive(Clone)]
pub struct Context {
    state: Rc<ContextState>,
}

struct ContextState {
    error: RefCell<Option<Error>>,
    recovered: Cell<bool>,
}

impl Context {
    /// Create a context
    ///
    /// It must be passed to [`recover`](crate::recover) (or created through
    /// [`guard`](crate::guard)) before any throw goes through it.
    pub fn new() -> Self {
        Self {
            state: Rc::new(ContextState {
                error: RefCell::new(None),
                recovered: Cell::new(false),
            }),
        }
    }

    /// Throw through this context
    ///
    /// See [`catch`](crate::catch).
    ///
    /// # Panics
    ///
    /// Raises [`BoundaryMisuse::CatchAfterRecover`] once the boundary has run.
    pub fn catch(&self, condition: impl Into<Condition>) {
        self.catch_with(condition, Problem::None);
    }

    /// Throw through this context with a problem description
    ///
    /// See [`catch_with`](crate::catch_with).
    pub fn catch_with(&self, condition: impl Into<Condition>, problem: impl Into<Problem>) {
        self.ensure_live();
        catch::catch_with(condition, problem);
    }

    /// Return the value of `result`, or throw its error through this context
    pub fn check<T, E>(&self, result: Result<T, E>) -> T
    where
        E: StdError + Send + Sync + 'static,
    {
        self.check_with(result, Problem::None)
    }

    /// Return the value of `result`, or throw its error described by `problem`
    pub fn check_with<T, E>(&self, result: Result<T, E>, problem: impl Into<Problem>) -> T
    where
        E: StdError + Send + Sync + 'static,
    {
        self.ensure_live();
        match result {
            Ok(value) => value,
            Err(err) => catch::throw_failure(Error::new(err), problem.into()),
        }
    }

    /// Whether the bound boundary has run
    pub fn is_recovered(&self) -> bool {
        self.state.recovered.get()
    }

    /// Whether the slot currently holds an error
    pub fn has_error(&self) -> bool {
        self.state.error.borrow().is_some()
    }

    /// Take the error out of the slot
    pub fn take_error(&self) -> Option<Error> {
        self.state.error.borrow_mut().take()
    }

    pub(crate) fn store(&self, err: Option<Error>) {
        *self.state.error.borrow_mut() = err;
    }

    /// Activation hook, run once by the boundary
    pub(crate) fn on_recover(&self) {
        if self.state.recovered.replace(true) {
            BoundaryMisuse::DuplicateRecover.raise();
        }
    }

    fn ensure_live(&self) {
        if self.is_recovered() {
            // The boundary is gone, most likely it was run directly instead
            // of around the code using this context.
            BoundaryMisuse::CatchAfterRecover.raise();
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("recovered", &self.is_recovered())
            .field("has_error", &self.has_error())
            .finish()
    }
}

impl Drop for ContextState {
    fn drop(&mut self) {
        if self.recovered.get() || std::thread::panicking() {
            return;
        }
        if crate::config::settings().leak_check {
            tracing::warn!("context dropped without ever being recovered; a boundary is missing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use crate::{annotations, recover};
    use std::panic::{self, AssertUnwindSafe};

    fn misuse(f: impl FnOnce()) -> Option<BoundaryMisuse> {
        panic::catch_unwind(AssertUnwindSafe(f))
            .err()
            .and_then(|payload| payload.downcast_ref::<BoundaryMisuse>().copied())
    }

    #[test]
    fn test_single_recover() {
        let ct = Context::new();
        assert!(misuse(|| {
            recover(&ct, ["test"], || Ok(()));
        })
        .is_none());
        assert!(ct.is_recovered());
        assert!(!ct.has_error());
    }

    #[test]
    fn test_duplicate_recover() {
        let ct = Context::new();
        let fault = misuse(|| {
            recover(&ct, ["test"], || Ok(()));
            recover(&ct, ["test"], || Ok(()));
        });
        assert_eq!(fault, Some(BoundaryMisuse::DuplicateRecover));
    }

    #[test]
    fn test_nested_duplicate_is_not_absorbed() {
        let ct = Context::new();
        let fault = misuse(|| {
            recover(&ct, annotations![], || {
                recover(&ct, annotations![], || Ok(()));
                Ok(())
            });
        });
        assert_eq!(fault, Some(BoundaryMisuse::DuplicateRecover));
    }

    #[test]
    fn test_catch_after_recover() {
        let ct = Context::new();
        recover(&ct, ["test"], || Ok(()));

        for _ in 0..3 {
            assert_eq!(
                misuse(|| ct.catch_with(true, "whoops")),
                Some(BoundaryMisuse::CatchAfterRecover)
            );
        }
        assert_eq!(
            misuse(|| ct.catch(false)),
            Some(BoundaryMisuse::CatchAfterRecover)
        );
    }

    #[test]
    fn test_check() {
        let ct = Context::new();
        recover(&ct, ["parsing"], || {
            assert_eq!(ct.check("12".parse::<u8>()), 12);
            ct.check_with("x".parse::<u8>(), "bad number");
            Ok(())
        });
        assert_eq!(
            ct.take_error().unwrap().to_string(),
            "parsing: bad number: invalid digit found in string"
        );
    }

    #[test]
    fn test_clones_share_state() {
        let ct = Context::new();
        let inner = ct.clone();
        recover(&ct, annotations![], || {
            inner.catch_with(true, "from clone");
            Ok(())
        });
        assert!(inner.is_recovered());
        assert_eq!(inner.take_error().unwrap().to_string(), "from clone");
        assert!(!ct.has_error());
    }

    #[test]
    fn test_unrecovered_drop_warns() {
        let logs = capture_logs(|| drop(Context::new()));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("context dropped without ever being recovered"));
    }

    #[test]
    fn test_recovered_drop_is_silent() {
        let logs = capture_logs(|| {
            let ct = Context::new();
            let clone = ct.clone();
            recover(&ct, annotations![], || Ok(()));
            drop(ct);
            drop(clone);
        });
        assert!(!logs.contains("context dropped"));
    }

    #[test]
    fn test_debug() {
        let ct = Context::new();
        assert_eq!(
            format!("{:?}", ct),
            "Context { recovered: false, has_error: false }"
        );
        recover(&ct, annotations![], || Ok(()));
    }
}
