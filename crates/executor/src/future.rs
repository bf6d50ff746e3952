//! Completion futures and the promises that complete them.
//!
//! An [`EventFuture`] is the read side of an asynchronous operation: callers
//! query it, register [`Listener`]s, or block on it. A [`Promise`] is the
//! write side. Both are cheap handles over the same shared state, so cloning
//! either never copies the outcome.
//!
//! A future moves from pending to exactly one terminal state (succeeded,
//! failed or cancelled) and never leaves it. Listeners run once each, in
//! registration order, on the thread that completed the future, or on the
//! registering thread when the future is already terminal.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;

use crate::error::{Cause, ExecutorError, Result};
use crate::executor::EventExecutor;
use crate::listener::{Listener, listener, notify_listener, same_listener};

type Listeners<T> = SmallVec<[Listener<T>; 2]>;

enum Outcome<T> {
    Pending,
    Succeeded(T),
    Failed(Cause),
    Cancelled,
}

impl<T> Outcome<T> {
    fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

struct State<T> {
    outcome: Outcome<T>,
    listeners: Listeners<T>,
    /// A thread is currently draining `listeners` after completion.
    notifying: bool,
    uncancellable: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    done: Condvar,
    executor: Option<Weak<dyn EventExecutor>>,
    void: bool,
}

/// Read side of an asynchronous operation.
pub struct EventFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for EventFuture<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for EventFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.shared.state.lock().outcome {
            Outcome::Pending => "pending",
            Outcome::Succeeded(_) => "succeeded",
            Outcome::Failed(_) => "failed",
            Outcome::Cancelled => "cancelled",
        };
        f.debug_struct("EventFuture")
            .field("state", &state)
            .field("void", &self.shared.void)
            .finish()
    }
}

impl<T: Send + 'static> EventFuture<T> {
    fn with_outcome(
        outcome: Outcome<T>,
        executor: Option<Weak<dyn EventExecutor>>,
        void: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    outcome,
                    listeners: SmallVec::new(),
                    notifying: false,
                    uncancellable: false,
                }),
                done: Condvar::new(),
                executor,
                void,
            }),
        }
    }

    /// A future that has already succeeded with `value`.
    pub fn succeeded(value: T) -> Self {
        Self::with_outcome(Outcome::Succeeded(value), None, false)
    }

    /// A future that has already failed with `cause`.
    pub fn failed(cause: Cause) -> Self {
        Self::with_outcome(Outcome::Failed(cause), None, false)
    }

    pub(crate) fn succeeded_on(value: T, executor: Weak<dyn EventExecutor>) -> Self {
        Self::with_outcome(Outcome::Succeeded(value), Some(executor), false)
    }

    pub(crate) fn failed_on(cause: Cause, executor: Weak<dyn EventExecutor>) -> Self {
        Self::with_outcome(Outcome::Failed(cause), Some(executor), false)
    }

    /// Whether the future reached any terminal state.
    pub fn is_done(&self) -> bool {
        !self.shared.state.lock().outcome.is_pending()
    }

    /// Whether the future succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.shared.state.lock().outcome, Outcome::Succeeded(_))
    }

    /// Whether the future was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.shared.state.lock().outcome, Outcome::Cancelled)
    }

    /// Whether [`cancel`](Self::cancel) can still take effect.
    pub fn is_cancellable(&self) -> bool {
        let state = self.shared.state.lock();
        !self.shared.void && state.outcome.is_pending() && !state.uncancellable
    }

    /// Whether this is a void future that never tracks completion.
    pub fn is_void(&self) -> bool {
        self.shared.void
    }

    /// The failure cause, if the future failed or was cancelled.
    pub fn cause(&self) -> Option<Cause> {
        match &self.shared.state.lock().outcome {
            Outcome::Failed(cause) => Some(Arc::clone(cause)),
            Outcome::Cancelled => Some(ExecutorError::Cancelled.into_cause()),
            Outcome::Pending | Outcome::Succeeded(_) => None,
        }
    }

    /// Register a listener.
    ///
    /// Fires immediately on the calling thread when the future is already
    /// terminal. Registering the same listener twice notifies it twice.
    pub fn add_listener(&self, listener: Listener<T>) -> Result<&Self> {
        self.ensure_not_void("listener registration")?;
        {
            let mut state = self.shared.state.lock();
            if state.outcome.is_pending() || state.notifying {
                state.listeners.push(listener);
                return Ok(self);
            }
        }
        notify_listener(&listener, self);
        Ok(self)
    }

    /// Register several listeners in order.
    pub fn add_listeners<I>(&self, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = Listener<T>>,
    {
        for listener in listeners {
            self.add_listener(listener)?;
        }
        Ok(self)
    }

    /// Convenience for registering a closure.
    pub fn on_complete<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.add_listener(listener(f))
    }

    /// Remove the first registration of `listener`; absent listeners are ignored.
    pub fn remove_listener(&self, listener: &Listener<T>) -> Result<&Self> {
        self.ensure_not_void("listener removal")?;
        let mut state = self.shared.state.lock();
        if let Some(pos) = state
            .listeners
            .iter()
            .position(|registered| same_listener(registered, listener))
        {
            state.listeners.remove(pos);
        }
        Ok(self)
    }

    /// Remove the first registration of each listener.
    pub fn remove_listeners<'a, I>(&self, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Listener<T>>,
    {
        for listener in listeners {
            self.remove_listener(listener)?;
        }
        Ok(self)
    }

    /// Block until the future is terminal.
    ///
    /// # Errors
    /// `BlockingOperation` when called on a pending future from the thread of
    /// the executor that owns it; `IllegalState` on a void future.
    pub fn wait(&self) -> Result<&Self> {
        self.ensure_not_void("wait")?;
        let mut state = self.shared.state.lock();
        if !state.outcome.is_pending() {
            return Ok(self);
        }
        self.check_deadlock()?;
        while state.outcome.is_pending() {
            self.shared.done.wait(&mut state);
        }
        Ok(self)
    }

    /// Block for at most `timeout`, returning whether the future completed.
    ///
    /// A timeout does not cancel the underlying operation.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool> {
        self.ensure_not_void("wait")?;
        let mut state = self.shared.state.lock();
        if !state.outcome.is_pending() {
            return Ok(true);
        }
        if timeout.is_zero() {
            return Ok(false);
        }
        self.check_deadlock()?;
        let deadline = Instant::now() + timeout;
        while state.outcome.is_pending() {
            if self.shared.done.wait_until(&mut state, deadline).timed_out() {
                return Ok(!state.outcome.is_pending());
            }
        }
        Ok(true)
    }

    /// Wait, then surface a failure or cancellation as an error.
    pub fn sync(&self) -> Result<&Self> {
        self.wait()?;
        match &self.shared.state.lock().outcome {
            Outcome::Failed(cause) => Err(ExecutorError::Failed(Arc::clone(cause))),
            Outcome::Cancelled => Err(ExecutorError::Cancelled),
            Outcome::Pending | Outcome::Succeeded(_) => Ok(self),
        }
    }

    /// Cancel a pending, cancellable future.
    ///
    /// Returns `false` and changes nothing when the future is terminal or
    /// uncancellable. `may_interrupt` is advisory: running work is never
    /// preempted.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        if self.shared.void {
            return false;
        }
        let cancelled = self.complete_with(|state| {
            if state.uncancellable {
                None
            } else {
                Some(Outcome::Cancelled)
            }
        });
        if cancelled {
            tracing::trace!(may_interrupt, "future cancelled");
        }
        cancelled
    }

    /// Adapter that lets async code `.await` this future.
    pub fn completion(&self) -> Completion<T> {
        Completion {
            future: self.clone(),
            waker: None,
        }
    }

    fn ensure_not_void(&self, operation: &str) -> Result<()> {
        if self.shared.void {
            return Err(ExecutorError::illegal_state(format!(
                "{operation} is not supported on a void future"
            )));
        }
        Ok(())
    }

    fn check_deadlock(&self) -> Result<()> {
        let executor = self.shared.executor.as_ref().and_then(Weak::upgrade);
        if let Some(executor) = executor
            && executor.in_event_loop()
        {
            return Err(ExecutorError::BlockingOperation {
                executor: executor.id(),
            });
        }
        Ok(())
    }

    /// Transition out of pending if `decide` yields an outcome, then notify.
    fn complete_with<F>(&self, decide: F) -> bool
    where
        F: FnOnce(&State<T>) -> Option<Outcome<T>>,
    {
        let batch = {
            let mut state = self.shared.state.lock();
            if !state.outcome.is_pending() {
                return false;
            }
            let Some(outcome) = decide(&state) else {
                return false;
            };
            state.outcome = outcome;
            self.shared.done.notify_all();
            if state.listeners.is_empty() {
                return true;
            }
            state.notifying = true;
            std::mem::take(&mut state.listeners)
        };
        self.drain_listeners(batch);
        true
    }

    fn drain_listeners(&self, mut batch: Listeners<T>) {
        loop {
            for listener in &batch {
                notify_listener(listener, self);
            }
            let mut state = self.shared.state.lock();
            if state.listeners.is_empty() {
                state.notifying = false;
                return;
            }
            batch = std::mem::take(&mut state.listeners);
        }
    }
}

impl<T: Clone + Send + 'static> EventFuture<T> {
    /// The result if the future succeeded, `None` otherwise.
    ///
    /// `None` does not imply the future is pending; use
    /// [`is_done`](Self::is_done) to test completion.
    pub fn get_now(&self) -> Option<T> {
        match &self.shared.state.lock().outcome {
            Outcome::Succeeded(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Wait and return the result, surfacing failure as an error.
    pub fn get(&self) -> Result<T> {
        self.wait()?;
        self.try_result()
            .unwrap_or_else(|| Err(ExecutorError::illegal_state("future still pending")))
    }

    fn try_result(&self) -> Option<Result<T>> {
        match &self.shared.state.lock().outcome {
            Outcome::Pending => None,
            Outcome::Succeeded(value) => Some(Ok(value.clone())),
            Outcome::Failed(cause) => Some(Err(ExecutorError::Failed(Arc::clone(cause)))),
            Outcome::Cancelled => Some(Err(ExecutorError::Cancelled)),
        }
    }
}

/// `std::future::Future` adapter returned by [`EventFuture::completion`].
pub struct Completion<T> {
    future: EventFuture<T>,
    waker: Option<Arc<Mutex<Option<Waker>>>>,
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("future", &self.future)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.future.is_void() {
            return Poll::Ready(Err(ExecutorError::illegal_state(
                "a void future never completes",
            )));
        }
        if let Some(result) = this.future.try_result() {
            return Poll::Ready(result);
        }

        match &this.waker {
            Some(slot) => {
                *slot.lock() = Some(cx.waker().clone());
            }
            None => {
                let slot = Arc::new(Mutex::new(Some(cx.waker().clone())));
                let wake = Arc::clone(&slot);
                this.future.add_listener(listener(move |_: &EventFuture<T>| {
                    if let Some(waker) = wake.lock().take() {
                        waker.wake();
                    }
                }))?;
                this.waker = Some(slot);
            }
        }

        match this.future.try_result() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}

/// Write side of an asynchronous operation.
///
/// Dereferences to its [`EventFuture`] so a promise can be queried and
/// listened to directly.
pub struct Promise<T> {
    future: EventFuture<T>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise").field(&self.future).finish()
    }
}

impl<T> std::ops::Deref for Promise<T> {
    type Target = EventFuture<T>;

    fn deref(&self) -> &EventFuture<T> {
        &self.future
    }
}

impl<T: Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Promise<T> {
    /// A pending promise not bound to any executor.
    ///
    /// Blocking waits on it are never refused by the deadlock guard.
    pub fn new() -> Self {
        Self {
            future: EventFuture::with_outcome(Outcome::Pending, None, false),
        }
    }

    /// A pending promise owned by `executor`.
    pub fn with_executor(executor: Weak<dyn EventExecutor>) -> Self {
        Self {
            future: EventFuture::with_outcome(Outcome::Pending, Some(executor), false),
        }
    }

    /// A promise that accepts and discards completion and refuses
    /// listeners and waiting.
    pub fn void() -> Self {
        Self {
            future: EventFuture::with_outcome(Outcome::Pending, None, true),
        }
    }

    /// The read side of this promise.
    pub fn future(&self) -> EventFuture<T> {
        self.future.clone()
    }

    /// Complete with `value`.
    ///
    /// # Errors
    /// `AlreadyCompleted` when the future is already terminal.
    pub fn set_success(&self, value: T) -> Result<&Self> {
        if self.try_success(value) || self.future.is_void() {
            Ok(self)
        } else {
            Err(ExecutorError::AlreadyCompleted)
        }
    }

    /// Complete with `value`, returning `false` if already terminal.
    pub fn try_success(&self, value: T) -> bool {
        if self.future.is_void() {
            return false;
        }
        self.future
            .complete_with(move |_| Some(Outcome::Succeeded(value)))
    }

    /// Fail with `cause`.
    ///
    /// # Errors
    /// `AlreadyCompleted` when the future is already terminal.
    pub fn set_failure(&self, cause: Cause) -> Result<&Self> {
        if self.try_failure(cause) || self.future.is_void() {
            Ok(self)
        } else {
            Err(ExecutorError::AlreadyCompleted)
        }
    }

    /// Fail with `cause`, returning `false` if already terminal.
    pub fn try_failure(&self, cause: Cause) -> bool {
        if self.future.is_void() {
            return false;
        }
        self.future.complete_with(move |_| Some(Outcome::Failed(cause)))
    }

    /// Forbid cancellation from now on.
    ///
    /// Returns `true` if the promise is now uncancellable or already
    /// completed without being cancelled.
    pub fn set_uncancellable(&self) -> bool {
        if self.future.is_void() {
            return false;
        }
        let mut state = self.future.shared.state.lock();
        match state.outcome {
            Outcome::Pending => {
                state.uncancellable = true;
                true
            }
            Outcome::Cancelled => false,
            Outcome::Succeeded(_) | Outcome::Failed(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Listener<u32> {
        let log = Arc::clone(log);
        listener(move |_| log.lock().push(tag))
    }

    #[test]
    fn listener_on_succeeded_future_fires_synchronously_once() {
        let future = EventFuture::succeeded(7_u32);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        future
            .on_complete(move |f| {
                assert_eq!(f.get_now(), Some(7));
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let promise = Promise::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        promise
            .add_listeners([
                recorder(&log, "a"),
                recorder(&log, "b"),
                recorder(&log, "c"),
            ])
            .unwrap();
        assert!(log.lock().is_empty());

        promise.set_success(1).unwrap();
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_listener_registers_twice_and_remove_takes_first() {
        let promise = Promise::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let l: Listener<u32> = listener(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        promise.add_listener(Arc::clone(&l)).unwrap();
        promise.add_listener(Arc::clone(&l)).unwrap();
        promise.remove_listener(&l).unwrap();
        promise.set_success(3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removing_unknown_listener_is_noop() {
        let promise = Promise::<u32>::new();
        let stranger: Listener<u32> = listener(|_| {});
        promise.remove_listener(&stranger).unwrap();
        promise.remove_listeners([&stranger, &stranger]).unwrap();
        assert!(!promise.is_done());
    }

    #[test]
    fn listener_added_during_notification_runs_after_current_batch() {
        let promise = Promise::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let late = recorder(&log, "late");
        let inner_log = Arc::clone(&log);
        promise
            .on_complete(move |f| {
                inner_log.lock().push("first");
                f.add_listener(Arc::clone(&late)).unwrap();
            })
            .unwrap();
        promise.add_listener(recorder(&log, "second")).unwrap();

        promise.set_success(0).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second", "late"]);
    }

    #[test]
    fn panicking_listener_does_not_starve_others() {
        let promise = Promise::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        promise.on_complete(|_| panic!("listener bug")).unwrap();
        promise
            .on_complete(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        promise.set_success(1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_completion_is_rejected() {
        let promise = Promise::<u32>::new();
        promise.set_success(1).unwrap();

        assert!(matches!(
            promise.set_success(2),
            Err(ExecutorError::AlreadyCompleted)
        ));
        assert!(!promise.try_failure(ExecutorError::illegal_state("late").into_cause()));
        assert_eq!(promise.get_now(), Some(1));
        assert!(promise.cause().is_none());
    }

    #[test]
    fn cancel_pending_notifies_with_cancellation_cause() {
        let promise = Promise::<u32>::new();
        let observed = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&observed);
        promise
            .on_complete(move |f| *slot.lock() = Some(f.is_cancelled()))
            .unwrap();

        assert!(promise.is_cancellable());
        assert!(promise.cancel(true));
        assert_eq!(*observed.lock(), Some(true));
        assert!(promise.is_done());
        assert!(!promise.is_success());
        let cause = promise.cause().unwrap();
        assert!(cause.to_string().contains("cancelled"));
        assert!(matches!(promise.sync(), Err(ExecutorError::Cancelled)));
    }

    #[test]
    fn cancel_on_terminal_future_changes_nothing() {
        let ok = Promise::<u32>::new();
        ok.set_success(5).unwrap();
        assert!(!ok.cancel(false));
        assert_eq!(ok.get_now(), Some(5));
        assert!(ok.cause().is_none());

        let failed = Promise::<u32>::new();
        failed
            .set_failure(Arc::new(std::io::Error::other("nope")))
            .unwrap();
        assert!(!failed.cancel(true));
        assert!(!failed.is_cancelled());
        assert!(failed.cause().unwrap().to_string().contains("nope"));
    }

    #[test]
    fn uncancellable_promise_refuses_cancel() {
        let promise = Promise::<u32>::new();
        assert!(promise.set_uncancellable());
        assert!(!promise.is_cancellable());
        assert!(!promise.cancel(true));
        assert!(!promise.is_done());

        let cancelled = Promise::<u32>::new();
        cancelled.cancel(false);
        assert!(!cancelled.set_uncancellable());
    }

    #[test]
    fn get_now_is_none_while_pending() {
        let promise = Promise::<Option<u32>>::new();
        assert_eq!(promise.get_now(), None);
        promise.set_success(None).unwrap();
        assert_eq!(promise.get_now(), Some(None));
        assert!(promise.is_done());
    }

    #[test]
    fn wait_timeout_reports_pending_then_completion() {
        let promise = Promise::<u32>::new();
        assert!(!promise.wait_timeout(Duration::from_millis(20)).unwrap());
        assert!(!promise.wait_timeout(Duration::ZERO).unwrap());

        let completer = promise.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.set_success(11).unwrap();
        });
        assert!(promise.wait_timeout(Duration::from_secs(5)).unwrap());
        assert_eq!(promise.get().unwrap(), 11);
        handle.join().unwrap();
    }

    #[test]
    fn sync_surfaces_failure_cause() {
        let promise = Promise::<u32>::new();
        promise
            .set_failure(Arc::new(std::io::Error::other("socket closed")))
            .unwrap();
        let err = promise.sync().unwrap_err();
        assert!(matches!(err, ExecutorError::Failed(_)));
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn void_promise_refuses_listeners_and_waits() {
        let promise = Promise::<()>::void();
        assert!(promise.is_void());
        assert!(matches!(
            promise.on_complete(|_| {}),
            Err(ExecutorError::IllegalState(_))
        ));
        assert!(matches!(promise.wait(), Err(ExecutorError::IllegalState(_))));
        assert!(promise.set_success(()).is_ok());
        assert!(!promise.try_success(()));
        assert!(!promise.is_done());
        assert!(!promise.cancel(true));
    }

    #[tokio::test]
    async fn completion_resolves_when_completed_from_another_thread() {
        let promise = Promise::<String>::new();
        let completer = promise.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completer.set_success("done".to_string()).unwrap();
        });
        let value = promise.completion().await.unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn completion_of_cancelled_future_is_error() {
        let promise = Promise::<u32>::new();
        promise.cancel(false);
        let err = promise.completion().await.unwrap_err();
        assert!(err.is_cancelled());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn notification_order_matches_surviving_registrations(
                removals in proptest::collection::vec(any::<bool>(), 1..12)
            ) {
                let promise = Promise::<u32>::new();
                let log = Arc::new(Mutex::new(Vec::new()));
                let mut registered = Vec::new();
                for (idx, _) in removals.iter().enumerate() {
                    let log = Arc::clone(&log);
                    let l: Listener<u32> = listener(move |_| log.lock().push(idx));
                    promise.add_listener(Arc::clone(&l)).unwrap();
                    registered.push(l);
                }
                let mut expected = Vec::new();
                for (idx, remove) in removals.iter().enumerate() {
                    if *remove {
                        promise.remove_listener(&registered[idx]).unwrap();
                    } else {
                        expected.push(idx);
                    }
                }
                promise.set_success(0).unwrap();
                prop_assert_eq!(log.lock().clone(), expected);
            }
        }
    }
}
