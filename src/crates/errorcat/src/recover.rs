//! Recovery boundaries
//!
//! A boundary runs a body and converts any throw (or any other panic) that
//! unwinds out of it into an ordinary error value. The error is annotated and
//! written to the boundary's [`Target`].
//!
//! # Example
//!
//! ```rust
//! use errorcat::{catch_with, recover, Error};
//!
//! fn special_function(fail_fast: bool) -> Result<(), Error> {
//!     let mut rerr = None;
//!     recover(&mut rerr, ["special_function failed"], || {
//!         catch_with(fail_fast, "bad condition");
//!         catch_with(Some(Error::msg("an error state")), "found myerr");
//!         Ok(())
//!     });
//!     rerr.map_or(Ok(()), Err)
//! }
//!
//! assert_eq!(
//!     special_function(true).unwrap_err().to_string(),
//!     "special_function failed: bad condition"
//! );
//! assert_eq!(
//!     special_function(false).unwrap_err().to_string(),
//!     "special_function failed: found myerr: an error state"
//! );
//! ```

use crate::annotate::{self, Annotation};
use crate::catch::Thrown;
use crate::context::Context;
use crate::error::{BoundaryMisuse, Error};
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks a boundary as active on the current thread while alive
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether a recovery boundary is running on the current thread
pub fn is_guarded() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

/// Where a boundary stores its result
#[derive(Debug)]
pub enum Target<'a> {
    /// A caller-owned error slot
    Slot(&'a mut Option<Error>),
    /// The slot of a context; the context is marked recovered
    Context(&'a Context),
    /// No slot; annotations still run, then the error is dropped
    Detached,
}

impl<'a> From<&'a mut Option<Error>> for Target<'a> {
    fn from(slot: &'a mut Option<Error>) -> Self {
        Self::Slot(slot)
    }
}

impl<'a> From<&'a Context> for Target<'a> {
    fn from(context: &'a Context) -> Self {
        Self::Context(context)
    }
}

impl From<()> for Target<'_> {
    fn from(_: ()) -> Self {
        Self::Detached
    }
}

impl Target<'_> {
    fn activate(&self) {
        if let Self::Context(context) = self {
            context.on_recover();
        }
    }

    fn take(&mut self) -> Option<Error> {
        match self {
            Self::Slot(slot) => slot.take(),
            Self::Context(context) => context.take_error(),
            Self::Detached => None,
        }
    }

    fn store(&mut self, err: Option<Error>) {
        match self {
            Self::Slot(slot) => **slot = err,
            Self::Context(context) => context.store(err),
            Self::Detached => {}
        }
    }
}

/// Run `body` inside a recovery boundary
///
/// Whatever unwinds out of `body` is intercepted:
///
/// - a throw is unwrapped to the thrown error
/// - any other panic becomes an error carrying its message
/// - a [`BoundaryMisuse`] fault is re-raised and never absorbed
///
/// If nothing unwinds, an `Err` returned by `body` is taken instead, and
/// otherwise the current value of the target's slot, so several boundaries
/// can annotate the same slot in turn.
///
/// The error, if any, runs through `annotations` and is written back to the
/// target.
///
/// # Returns
///
/// `Some(value)` when `body` returned `Ok(value)`, `None` otherwise.
///
/// # Panics
///
/// Recovering the same [`Context`] twice raises
/// [`BoundaryMisuse::DuplicateRecover`].
pub fn recover<'a, T, A>(
    target: impl Into<Target<'a>>,
    annotations: A,
    body: impl FnOnce() -> Result<T, Error>,
) -> Option<T>
where
    A: IntoIterator,
    A::Item: Into<Annotation>,
{
    let mut target = target.into();
    let chain = annotate::collect(annotations);

    let outcome = {
        let _depth = DepthGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(body))
    };

    target.activate();

    let (value, captured) = match outcome {
        Ok(Ok(value)) => (Some(value), target.take()),
        Ok(Err(err)) => (None, Some(err)),
        Err(payload) => (None, Some(intercept(payload))),
    };

    let result = captured.and_then(|err| annotate::apply_chain(err, chain));
    target.store(result);
    value
}

/// Run `body` inside a boundary and return its error
///
/// The unchecked counterpart of [`guard`]: nothing is passed down, so code
/// inside throws with the free [`catch`](crate::catch) functions.
///
/// # Example
///
/// ```rust
/// use errorcat::{scope, OrThrow};
///
/// let err = scope(
///     || {
///         let _config = std::fs::read_to_string("nonexistent-config-file.txt")
///             .or_throw_with("couldn't open configuration file");
///         Ok(())
///     },
///     errorcat::annotations![],
/// )
/// .unwrap_err();
/// assert!(err.to_string().starts_with("couldn't open configuration file: "));
/// ```
pub fn scope<A>(body: impl FnOnce() -> Result<(), Error>, annotations: A) -> Result<(), Error>
where
    A: IntoIterator,
    A::Item: Into<Annotation>,
{
    let mut rerr = None;
    recover(&mut rerr, annotations, body);
    rerr.map_or(Ok(()), Err)
}

/// Create a context, run `body` with it inside a boundary, and return its error
///
/// # Example
///
/// ```rust
/// use errorcat::{guard, Context, Error};
///
/// fn unsafe_function(ct: &Context) {
///     ct.catch_with(Some(Error::msg("this is an error")), "caught the err");
///     unreachable!();
/// }
///
/// let err = guard(
///     |ct| {
///         unsafe_function(ct);
///         Ok(())
///     },
///     ["test"],
/// )
/// .unwrap_err();
/// assert_eq!(err.to_string(), "test: caught the err: this is an error");
/// ```
pub fn guard<A>(body: impl FnOnce(&Context) -> Result<(), Error>, annotations: A) -> Result<(), Error>
where
    A: IntoIterator,
    A::Item: Into<Annotation>,
{
    let context = Context::new();
    recover(&context, annotations, || body(&context));
    context.take_error().map_or(Ok(()), Err)
}

/// Convert an intercepted panic payload into an error
fn intercept(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Thrown>() {
        Ok(thrown) => {
            let err = thrown.into_cause();
            tracing::debug!(error = %err, "recovered thrown error");
            return err;
        }
        Err(payload) => payload,
    };

    if payload.is::<BoundaryMisuse>() {
        panic::resume_unwind(payload);
    }

    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };

    let message = panic_payload_to_string(payload.as_ref());
    tracing::debug!(panic = %message, "recovered foreign panic");
    Error::msg(message)
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotations, catch, catch_with, CatchMisuse};

    #[test]
    fn test_slot_receives_thrown_error() {
        let mut rerr = None;
        let value = recover(&mut rerr, ["string annotation"], || {
            catch_with(true, "bad condition 1");
            Ok(1)
        });

        assert_eq!(value, None);
        assert_eq!(rerr.unwrap().to_string(), "string annotation: bad condition 1");
    }

    #[test]
    fn test_success_returns_value() {
        let mut rerr = None;
        let value = recover(&mut rerr, annotations![], || Ok::<_, Error>(5));
        assert_eq!(value, Some(5));
        assert!(rerr.is_none());
    }

    #[test]
    fn test_returned_error_is_annotated() {
        let mut rerr = None;
        recover(&mut rerr, ["outer"], || Err::<(), _>(Error::msg("returned")));
        assert_eq!(rerr.unwrap().to_string(), "outer: returned");
    }

    #[test]
    fn test_cumulative_slot_annotation() {
        let mut rerr = None;
        recover(&mut rerr, ["site"], || {
            catch(Some(Error::msg("cause")));
            Ok(())
        });
        recover(&mut rerr, ["boundary"], || Ok(()));

        assert_eq!(rerr.unwrap().to_string(), "boundary: site: cause");
    }

    #[test]
    fn test_foreign_panics() {
        let mut rerr = None;
        recover(&mut rerr, annotations![], || -> Result<(), Error> { panic!("test error") });
        assert_eq!(rerr.take().unwrap().to_string(), "test error");

        let index = std::hint::black_box(7);
        recover(&mut rerr, annotations![], || {
            let values = [1, 2, 3];
            Ok(values[index % 10])
        });
        assert!(rerr.take().unwrap().to_string().contains("index out of bounds"));

        recover(&mut rerr, annotations![], || -> Result<(), Error> {
            std::panic::panic_any(42_u32)
        });
        assert_eq!(rerr.take().unwrap().to_string(), "unknown panic");

        recover(&mut rerr, annotations![], || -> Result<(), Error> {
            std::panic::panic_any(Error::new(CatchMisuse::BadCondition))
        });
        assert!(rerr.take().unwrap().matches(&CatchMisuse::BadCondition));
    }

    #[test]
    fn test_detached_runs_annotations() {
        let (tx, rx) = std::sync::mpsc::channel();
        recover(
            (),
            annotations![Annotation::transform(move |err| {
                let _ = tx.send(err.to_string());
                None
            })],
            || {
                catch_with(true, "logged only");
                Ok(())
            },
        );
        assert_eq!(rx.try_recv().ok().as_deref(), Some("logged only"));
    }

    #[test]
    fn test_depth_tracking() {
        assert!(!is_guarded());
        let mut rerr = None;
        recover(&mut rerr, annotations![], || {
            assert!(is_guarded());
            catch(true);
            Ok(())
        });
        assert!(!is_guarded());
        assert!(rerr.unwrap().matches(&CatchMisuse::MissingProblem));
    }

    #[test]
    fn test_misuse_is_not_absorbed() {
        let payload = panic::catch_unwind(|| {
            let mut rerr = None;
            recover(&mut rerr, annotations![], || -> Result<(), Error> {
                BoundaryMisuse::CatchAfterRecover.raise()
            });
        })
        .unwrap_err();

        assert_eq!(
            payload.downcast_ref::<BoundaryMisuse>(),
            Some(&BoundaryMisuse::CatchAfterRecover)
        );
        assert!(!is_guarded());
    }

    #[test]
    fn test_scope_and_guard() {
        let err = scope(
            || {
                catch_with(true, "scoped");
                Ok(())
            },
            ["scope"],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "scope: scoped");

        let err = guard(
            |ct| {
                ct.catch_with(true, "guarded");
                Ok(())
            },
            ["guard"],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "guard: guarded");

        assert!(guard(|_| Ok(()), ["unused"]).is_ok());
    }
}
