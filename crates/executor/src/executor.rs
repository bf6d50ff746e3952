//! The execution context contract.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use crate::error::{Cause, ExecutorError, Result, panic_message};
use crate::future::{EventFuture, Promise};
use crate::group::EventExecutorGroup;
use crate::progressive::ProgressivePromise;

/// Unit of work run on an executor's thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

static NEXT_EXECUTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an executor.
///
/// Two executors never share an id, so tables keyed by it compare
/// executors by identity rather than by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutorId(u64);

impl ExecutorId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_EXECUTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executor-{}", self.0)
    }
}

/// A task-running unit with single-logical-thread semantics.
///
/// Tasks submitted to one executor run strictly one after another on the
/// executor's own thread. The only lifecycle signal it exposes is its
/// [`termination_future`](Self::termination_future).
pub trait EventExecutor: Send + Sync + 'static {
    /// Identity of this executor.
    fn id(&self) -> ExecutorId;

    /// The group this executor belongs to, if it still exists.
    fn parent(&self) -> Option<Arc<dyn EventExecutorGroup>>;

    /// Whether the calling thread is this executor's thread.
    fn in_event_loop(&self) -> bool {
        self.in_event_loop_thread(thread::current().id())
    }

    /// Whether `thread` is the thread driving this executor's task queue.
    ///
    /// Always `false` before the executor has started a thread.
    fn in_event_loop_thread(&self, thread: ThreadId) -> bool;

    /// Whether the executor stopped accepting new tasks.
    fn is_shutting_down(&self) -> bool;

    /// Whether the executor stopped permanently.
    fn is_terminated(&self) -> bool {
        self.termination_future().is_done()
    }

    /// Queue `task` for execution.
    ///
    /// # Errors
    /// `Rejected` once the executor is shutting down.
    fn execute(&self, task: Task) -> Result<()>;

    /// Stop accepting work, finish queued tasks and terminate.
    ///
    /// Returns the termination future.
    fn shutdown_gracefully(&self) -> EventFuture<()>;

    /// Future that succeeds exactly once, when the executor stops.
    fn termination_future(&self) -> EventFuture<()>;

    /// Weak handle to this executor, used to bind promises to it.
    fn downgrade(&self) -> Weak<dyn EventExecutor>;
}

/// Factories for futures bound to an executor.
///
/// Implemented for every [`EventExecutor`], including trait objects.
pub trait ExecutorExt: EventExecutor {
    /// A pending promise owned by this executor.
    fn new_promise<T: Send + 'static>(&self) -> Promise<T> {
        Promise::with_executor(self.downgrade())
    }

    /// A pending progressive promise owned by this executor.
    fn new_progressive_promise<T: Send + 'static>(&self) -> ProgressivePromise<T> {
        ProgressivePromise::from_promise(self.new_promise())
    }

    /// A future that already succeeded; listeners on it fire immediately.
    fn new_succeeded_future<T: Send + 'static>(&self, value: T) -> EventFuture<T> {
        EventFuture::succeeded_on(value, self.downgrade())
    }

    /// A future that already failed; listeners on it fire immediately.
    fn new_failed_future<T: Send + 'static>(&self, cause: Cause) -> EventFuture<T> {
        EventFuture::failed_on(cause, self.downgrade())
    }

    /// Run `f` on this executor and expose its result as a future.
    ///
    /// A panic in `f` fails the future with `TaskPanicked`; a rejected task,
    /// or one dropped without running, fails it with `Rejected`. Cancelling
    /// the future before the task starts skips the task.
    fn submit<T, F>(&self, f: F) -> EventFuture<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let promise = self.new_promise::<T>();
        let guard = UnrunTask {
            promise: promise.clone(),
            executor: self.id(),
        };
        let task: Task = Box::new(move || {
            let guard = guard;
            if !guard.promise.set_uncancellable() {
                return;
            }
            match catch_unwind(AssertUnwindSafe(f)) {
                Ok(value) => {
                    guard.promise.try_success(value);
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    guard
                        .promise
                        .try_failure(ExecutorError::TaskPanicked(message).into_cause());
                }
            }
        });
        if let Err(err) = self.execute(task) {
            promise.try_failure(err.into_cause());
        }
        promise.future()
    }
}

/// Fails a submitted task's promise if the task is dropped before completing it.
struct UnrunTask<T: Send + 'static> {
    promise: Promise<T>,
    executor: ExecutorId,
}

impl<T: Send + 'static> Drop for UnrunTask<T> {
    fn drop(&mut self) {
        if self
            .promise
            .try_failure(ExecutorError::Rejected { executor: self.executor }.into_cause())
        {
            tracing::debug!(executor = %self.executor, "submitted task dropped without running");
        }
    }
}

impl<E: EventExecutor + ?Sized> ExecutorExt for E {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts every task and drops it unrun.
    struct Discarding {
        id: ExecutorId,
        this: Weak<Discarding>,
        termination: Promise<()>,
    }

    impl Discarding {
        fn new() -> Arc<Self> {
            Arc::new_cyclic(|this: &Weak<Self>| Self {
                id: ExecutorId::next(),
                this: this.clone(),
                termination: Promise::new(),
            })
        }
    }

    impl EventExecutor for Discarding {
        fn id(&self) -> ExecutorId {
            self.id
        }

        fn parent(&self) -> Option<Arc<dyn EventExecutorGroup>> {
            None
        }

        fn in_event_loop_thread(&self, _thread: ThreadId) -> bool {
            false
        }

        fn is_shutting_down(&self) -> bool {
            self.termination.is_done()
        }

        fn execute(&self, task: Task) -> Result<()> {
            drop(task);
            Ok(())
        }

        fn shutdown_gracefully(&self) -> EventFuture<()> {
            self.termination.try_success(());
            self.termination.future()
        }

        fn termination_future(&self) -> EventFuture<()> {
            self.termination.future()
        }

        fn downgrade(&self) -> Weak<dyn EventExecutor> {
            self.this.clone()
        }
    }

    #[test]
    fn dropped_task_fails_its_future() {
        let executor = Discarding::new();
        let id = executor.id();
        let future = executor.submit(|| 7_u8);

        assert!(future.is_done());
        let cause = future.cause().expect("dropped task must fail the future");
        assert!(matches!(
            cause.downcast_ref::<ExecutorError>(),
            Some(ExecutorError::Rejected { executor }) if *executor == id
        ));
    }

    #[test]
    fn executor_ids_are_unique_and_ordered() {
        let a = ExecutorId::next();
        let b = ExecutorId::next();
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(format!("{a}"), format!("executor-{}", a.as_u64()));
    }
}
