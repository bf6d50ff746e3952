//! Completion and progress listeners

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::panic_message;
use crate::future::EventFuture;

/// Callback notified once when a future reaches a terminal state.
///
/// Implemented for every `Fn(&EventFuture<T>)` closure, so most callers use
/// [`listener`] instead of implementing the trait by hand.
pub trait FutureListener<T>: Send + Sync + 'static {
    /// Invoked exactly once with the completed future.
    fn operation_complete(&self, future: &EventFuture<T>);
}

impl<T, F> FutureListener<T> for F
where
    F: Fn(&EventFuture<T>) + Send + Sync + 'static,
{
    fn operation_complete(&self, future: &EventFuture<T>) {
        self(future);
    }
}

/// Shared listener handle.
///
/// Removal matches by pointer identity, so keep a clone of the handle to
/// remove it later.
pub type Listener<T> = Arc<dyn FutureListener<T>>;

/// Wrap a closure as a [`Listener`].
pub fn listener<T, F>(f: F) -> Listener<T>
where
    T: 'static,
    F: Fn(&EventFuture<T>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Callback notified of progress on a [`ProgressivePromise`](crate::ProgressivePromise).
pub trait ProgressListener<T>: Send + Sync + 'static {
    /// `total` is negative when the end of the operation is unknown.
    fn operation_progressed(&self, future: &EventFuture<T>, progress: i64, total: i64);
}

impl<T, F> ProgressListener<T> for F
where
    F: Fn(&EventFuture<T>, i64, i64) + Send + Sync + 'static,
{
    fn operation_progressed(&self, future: &EventFuture<T>, progress: i64, total: i64) {
        self(future, progress, total);
    }
}

/// Shared progress listener handle.
pub type SharedProgressListener<T> = Arc<dyn ProgressListener<T>>;

/// Identity comparison for shared listeners, ignoring vtable pointers.
pub(crate) fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Run one listener, isolating a panic so the remaining listeners still fire.
pub(crate) fn notify_listener<T: 'static>(listener: &Listener<T>, future: &EventFuture<T>) {
    let outcome = catch_unwind(AssertUnwindSafe(|| listener.operation_complete(future)));
    if let Err(payload) = outcome {
        tracing::warn!(
            panic = %panic_message(payload.as_ref()),
            "future listener panicked"
        );
    }
}

pub(crate) fn notify_progress_listener<T: 'static>(
    listener: &SharedProgressListener<T>,
    future: &EventFuture<T>,
    progress: i64,
    total: i64,
) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        listener.operation_progressed(future, progress, total);
    }));
    if let Err(payload) = outcome {
        tracing::warn!(
            panic = %panic_message(payload.as_ref()),
            progress,
            total,
            "progress listener panicked"
        );
    }
}
