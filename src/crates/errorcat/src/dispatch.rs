//! Guarded work on a separate thread
//!
//! [`go`] runs a body under [`guard`] on a new thread and hands back a
//! [`Pending`] that yields the body's result exactly once.
//!
//! # Example
//!
//! ```rust
//! let err = errorcat::go(
//!     |ct| {
//!         ct.catch_with(true, "whoops");
//!         Ok(())
//!     },
//!     ["test"],
//! )
//! .wait()
//! .unwrap_err();
//!
//! assert_eq!(err.to_string(), "test: whoops");
//! ```
//!
//! `Pending` is also a future, so async callers can await it or put a
//! timeout around it:
//!
//! ```rust,ignore
//! let result = tokio::time::timeout(Duration::from_secs(5), errorcat::go(work, ["job"])).await;
//! ```

use crate::annotate::{self, Annotation};
use crate::context::Context;
use crate::error::Error;
use crate::recover::guard;
use std::any::Any;
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

/// Handle to the single result of a [`go`] call
#[derive(Debug)]
pub struct Pending {
    rx: oneshot::Receiver<Result<(), Error>>,
    handle: Option<JoinHandle<()>>,
}

impl Pending {
    fn ready(result: Result<(), Error>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx, handle: None }
    }

    /// Block until the result is delivered
    ///
    /// # Panics
    ///
    /// Must not be called from within an async runtime; await the `Pending`
    /// there instead. Re-raises the worker's panic if it died from a
    /// [`BoundaryMisuse`](crate::BoundaryMisuse) fault.
    pub fn wait(self) -> Result<(), Error> {
        let Pending { rx, handle } = self;
        match rx.blocking_recv() {
            Ok(result) => result,
            Err(_) => propagate_fault(handle),
        }
    }
}

/// The worker ended without sending a result; surface its panic here
fn propagate_fault(handle: Option<JoinHandle<()>>) -> ! {
    let payload: Box<dyn Any + Send> = match handle.map(JoinHandle::join) {
        Some(Err(payload)) => payload,
        _ => Box::new("errorcat worker exited without a result"),
    };
    panic::resume_unwind(payload)
}

impl Future for Pending {
    type Output = Result<(), Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => propagate_fault(self.handle.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Run `body` under [`guard`] on a new thread
///
/// The thread is named after [`Settings::thread_name`](crate::Settings). If
/// it cannot be spawned, the spawn error is delivered as the result.
pub fn go<F, A>(body: F, annotations: A) -> Pending
where
    F: FnOnce(&Context) -> Result<(), Error> + Send + 'static,
    A: IntoIterator,
    A::Item: Into<Annotation>,
{
    let chain = annotate::collect(annotations);
    let (tx, rx) = oneshot::channel();
    let name = crate::config::settings().thread_name;

    let spawned = thread::Builder::new().name(name).spawn(move || {
        let result = guard(body, chain);
        if tx.send(result).is_err() {
            tracing::debug!("go result dropped: receiver is gone");
        }
    });

    match spawned {
        Ok(handle) => Pending {
            rx,
            handle: Some(handle),
        },
        Err(err) => {
            tracing::warn!(error = %err, "failed to spawn errorcat worker thread");
            Pending::ready(Err(Error::new(err).context("spawning worker thread")))
        }
    }
}
