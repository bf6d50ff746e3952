//! Promises that report progress before completing

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::error::{ExecutorError, Result};
use crate::future::Promise;
use crate::listener::{SharedProgressListener, notify_progress_listener, same_listener};

/// A [`Promise`] that also notifies progress listeners.
///
/// Progress is only reported while the promise is pending.
pub struct ProgressivePromise<T> {
    promise: Promise<T>,
    progress_listeners: Arc<Mutex<SmallVec<[SharedProgressListener<T>; 1]>>>,
}

impl<T> Clone for ProgressivePromise<T> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            progress_listeners: Arc::clone(&self.progress_listeners),
        }
    }
}

impl<T> fmt::Debug for ProgressivePromise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressivePromise")
            .field("promise", &self.promise)
            .field("progress_listeners", &self.progress_listeners.lock().len())
            .finish()
    }
}

impl<T> std::ops::Deref for ProgressivePromise<T> {
    type Target = Promise<T>;

    fn deref(&self) -> &Promise<T> {
        &self.promise
    }
}

impl<T: Send + 'static> Default for ProgressivePromise<T> {
    fn default() -> Self {
        Self::from_promise(Promise::new())
    }
}

impl<T: Send + 'static> ProgressivePromise<T> {
    pub(crate) fn from_promise(promise: Promise<T>) -> Self {
        Self {
            promise,
            progress_listeners: Arc::new(Mutex::new(SmallVec::new())),
        }
    }

    /// The underlying promise.
    pub fn promise(&self) -> &Promise<T> {
        &self.promise
    }

    /// Register a progress listener.
    pub fn add_progress_listener(&self, listener: SharedProgressListener<T>) -> &Self {
        self.progress_listeners.lock().push(listener);
        self
    }

    /// Remove the first registration of `listener`.
    pub fn remove_progress_listener(&self, listener: &SharedProgressListener<T>) -> &Self {
        let mut listeners = self.progress_listeners.lock();
        if let Some(pos) = listeners.iter().position(|l| same_listener(l, listener)) {
            listeners.remove(pos);
        }
        self
    }

    /// Report progress.
    ///
    /// A negative `total` means the end is unknown.
    ///
    /// # Errors
    /// `InvalidArgument` for a negative `progress` or one beyond a known
    /// `total`; `IllegalState` once the promise is done.
    pub fn set_progress(&self, progress: i64, total: i64) -> Result<&Self> {
        let total = validate_progress(progress, total)?;
        if self.promise.is_done() {
            return Err(ExecutorError::illegal_state("complete already"));
        }
        self.notify_progress(progress, total);
        Ok(self)
    }

    /// Report progress, returning `false` for invalid arguments or a done promise.
    pub fn try_progress(&self, progress: i64, total: i64) -> bool {
        let Ok(total) = validate_progress(progress, total) else {
            return false;
        };
        if self.promise.is_done() {
            return false;
        }
        self.notify_progress(progress, total);
        true
    }

    fn notify_progress(&self, progress: i64, total: i64) {
        let snapshot: SmallVec<[SharedProgressListener<T>; 1]> =
            self.progress_listeners.lock().iter().cloned().collect();
        let future = self.promise.future();
        for listener in &snapshot {
            notify_progress_listener(listener, &future, progress, total);
        }
    }
}

/// Normalise `total` to `-1` when unknown and check the bounds.
fn validate_progress(progress: i64, total: i64) -> Result<i64> {
    if total < 0 {
        if progress < 0 {
            return Err(ExecutorError::invalid_argument(format!(
                "progress: {progress} (expected: >= 0)"
            )));
        }
        return Ok(-1);
    }
    if progress < 0 || progress > total {
        return Err(ExecutorError::invalid_argument(format!(
            "progress: {progress} (expected: 0 <= progress <= total ({total}))"
        )));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::EventFuture;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, Some(10))]
    #[case(10, 10, Some(10))]
    #[case(5, -7, Some(-1))]
    #[case(-1, 10, None)]
    #[case(11, 10, None)]
    #[case(-1, -1, None)]
    fn progress_validation(
        #[case] progress: i64,
        #[case] total: i64,
        #[case] expected: Option<i64>,
    ) {
        assert_eq!(validate_progress(progress, total).ok(), expected);
    }

    #[test]
    fn progress_listeners_see_each_report() {
        let promise = ProgressivePromise::<u32>::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: SharedProgressListener<u32> =
            Arc::new(move |_: &EventFuture<u32>, progress: i64, total: i64| {
                sink.lock().push((progress, total));
            });
        promise.add_progress_listener(listener);

        promise.set_progress(1, 4).unwrap();
        assert!(promise.try_progress(3, -5));
        assert!(!promise.try_progress(9, 4));
        assert_eq!(*seen.lock(), vec![(1, 4), (3, -1)]);
    }

    #[test]
    fn progress_after_completion_is_refused() {
        let promise = ProgressivePromise::<u32>::default();
        promise.set_success(1).unwrap();
        assert!(matches!(
            promise.set_progress(1, 2),
            Err(ExecutorError::IllegalState(_))
        ));
        assert!(!promise.try_progress(1, 2));
    }

    #[test]
    fn removed_progress_listener_is_silent() {
        let promise = ProgressivePromise::<u32>::default();
        let calls = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&calls);
        let listener: SharedProgressListener<u32> =
            Arc::new(move |_: &EventFuture<u32>, _: i64, _: i64| *sink.lock() += 1);
        promise.add_progress_listener(Arc::clone(&listener));
        promise.remove_progress_listener(&listener);
        promise.set_progress(1, 1).unwrap();
        assert_eq!(*calls.lock(), 0);
    }
}
